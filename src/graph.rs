//! The task graph: declared tasks, and the index from target to task.

use crate::canon::canon_path;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::PathBuf;

/// Id for a task, an index into Graph::tasks.  Tasks are compared by id,
/// never by the names of their targets.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TaskId(usize);
impl TaskId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TaskKind {
    /// Produces the files named by its targets; staleness comes from
    /// comparing their mtimes against the inputs.
    File,
    /// Targets are plain names with no files behind them.
    Phony,
}

impl TaskKind {
    /// Whether being requested with no enclosing file task is enough to
    /// make a task of this kind run.
    pub fn propagates_when_unforced(self) -> bool {
        match self {
            TaskKind::File => false,
            TaskKind::Phony => true,
        }
    }
}

/// What to do when a task runs.
pub enum Action {
    /// A command line, run through the shell in the project root.
    Command(String),
    /// An in-process function.
    Func(Box<dyn Fn() -> anyhow::Result<()>>),
}

impl Action {
    pub fn func(f: impl Fn() -> anyhow::Result<()> + 'static) -> Self {
        Action::Func(Box::new(f))
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Command(cmdline) => f.debug_tuple("Command").field(cmdline).finish(),
            Action::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Where a task was declared, for messages.
#[derive(Debug, Clone)]
pub struct FileLoc {
    pub filename: std::rc::Rc<PathBuf>,
    pub line: usize,
}
impl std::fmt::Display for FileLoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}:{}", self.filename.display(), self.line)
    }
}

#[derive(Debug)]
pub struct Task {
    pub kind: TaskKind,
    /// Never empty.
    pub targets: Vec<String>,
    pub prereqs: Vec<String>,
    pub action: Option<Action>,
    pub location: Option<FileLoc>,
}

impl Task {
    pub fn new(kind: TaskKind, targets: Vec<String>, prereqs: Vec<String>) -> Self {
        Task {
            kind,
            targets,
            prereqs,
            action: None,
            location: None,
        }
    }

    /// The name used to refer to the task in messages.
    pub fn name(&self) -> &str {
        &self.targets[0]
    }

    /// Paths of files this task produces; phony tasks produce none.
    pub fn target_files(&self) -> &[String] {
        match self.kind {
            TaskKind::File => &self.targets,
            TaskKind::Phony => &[],
        }
    }
}

#[derive(Default)]
pub struct Graph {
    tasks: Vec<Task>,
    target_to_task: FxHashMap<String, TaskId>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    /// Add a task, canonicalizing its targets and prerequisites.
    ///
    /// Two tasks claiming the same target is a caller error that is not
    /// diagnosed; lookups keep resolving to the first task that claimed it.
    pub fn add_task(&mut self, mut task: Task) -> TaskId {
        assert!(!task.targets.is_empty(), "task declared with no targets");
        let id = TaskId(self.tasks.len());
        for target in task.targets.iter_mut() {
            *target = canon_path(target.as_str());
            self.target_to_task.entry(target.clone()).or_insert(id);
        }
        for prereq in task.prereqs.iter_mut() {
            *prereq = canon_path(prereq.as_str());
        }
        self.tasks.push(task);
        id
    }

    pub fn task(&self, id: TaskId) -> &Task {
        &self.tasks[id.index()]
    }

    /// Find the task responsible for a target.
    pub fn find_task(&self, target: &str) -> Option<TaskId> {
        match self.target_to_task.get(target) {
            Some(&id) => Some(id),
            None => self.target_to_task.get(&canon_path(target)).copied(),
        }
    }

    /// The tasks producing a task's prerequisites, in declaration order and
    /// without duplicates.  Prerequisites no task produces are external
    /// files and are skipped.
    pub fn prereq_tasks(&self, id: TaskId) -> Vec<TaskId> {
        let mut seen = FxHashSet::default();
        self.task(id)
            .prereqs
            .iter()
            .filter_map(|prereq| self.find_task(prereq))
            .filter(|&t| seen.insert(t))
            .collect()
    }
}
