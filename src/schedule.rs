//! Deciding which tasks must run, and in what order.
//!
//! Building a schedule walks the graph depth-first from the requested task.
//! Every task reached gets exactly one entry, appended once its
//! prerequisites have been visited, so entries come out in an order where
//! prerequisites precede their dependents.
//!
//! File tasks decide for themselves by comparing their outputs against
//! their inputs.  Phony tasks have no files of their own; below a file task
//! they borrow that task's outputs as the basis for comparison, and their
//! "no" is only tentative: a dependent that turns out to need running forces
//! all the phony tasks beneath it to run too, down to (but not across) the
//! nearest file tasks.

use crate::error::{Error, Result};
use crate::graph::{TaskId, TaskKind};
use crate::project::{Project, Staleness};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::PathBuf;

/// The verdict for one task.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RunStatus {
    /// Will run.  Final.
    Yes,
    /// Won't run.  Final.
    NoFinal,
    /// Doesn't need to run as far as we know yet, but may still be upgraded
    /// to Yes later in the same pass.
    NoTentative,
}

impl RunStatus {
    /// Whether the verdict can no longer change.
    pub fn is_final(self) -> bool {
        match self {
            RunStatus::Yes | RunStatus::NoFinal => true,
            RunStatus::NoTentative => false,
        }
    }
}

/// Why a task got its verdict, for `-d explain`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Explain {
    /// A phony task requested with no file task above it.
    RootPhony,
    /// A prerequisite is going to run.
    PrereqRunning(TaskId),
    OutputMissing(PathBuf),
    Outdated { input: PathBuf, output: PathBuf },
    /// A dependent is going to run and this phony task has to go with it.
    Forced(TaskId),
    UpToDate,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub task: TaskId,
    pub status: RunStatus,
    pub explain: Explain,
}

/// The ordered run/skip decisions for one request.
#[derive(Debug, Default)]
pub struct Schedule {
    entries: Vec<Entry>,
    /// Index into entries, by task.
    index: FxHashMap<TaskId, usize>,
}

impl Schedule {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, id: TaskId) -> Option<&Entry> {
        self.index.get(&id).map(|&i| &self.entries[i])
    }

    pub fn status(&self, id: TaskId) -> Option<RunStatus> {
        self.entry(id).map(|e| e.status)
    }

    /// Tasks marked to run, in schedule order.
    pub fn to_run(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.entries
            .iter()
            .filter(|e| e.status == RunStatus::Yes)
            .map(|e| e.task)
    }

    /// Record a verdict: append a new entry, or replace a tentative one in
    /// place so the task keeps its original position.
    fn record(&mut self, task: TaskId, status: RunStatus, explain: Explain) {
        match self.index.get(&task) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                debug_assert!(!entry.status.is_final());
                if entry.status != status {
                    entry.status = status;
                    entry.explain = explain;
                }
            }
            None => {
                self.index.insert(task, self.entries.len());
                self.entries.push(Entry {
                    task,
                    status,
                    explain,
                });
            }
        }
    }

    /// Upgrade a tentative entry to Yes.  Returns false if there was
    /// nothing to upgrade.
    fn upgrade(&mut self, task: TaskId, by: TaskId) -> bool {
        let entry = match self.index.get(&task) {
            Some(&i) => &mut self.entries[i],
            None => return false,
        };
        if entry.status != RunStatus::NoTentative {
            return false;
        }
        entry.status = RunStatus::Yes;
        entry.explain = Explain::Forced(by);
        true
    }
}

struct Builder<'a> {
    project: &'a mut Project,
    schedule: Schedule,
    /// Tasks currently being visited, outermost first.
    stack: Vec<TaskId>,
    on_stack: FxHashSet<TaskId>,
}

/// Build the schedule for bringing `root` up to date.
pub fn build(project: &mut Project, root: TaskId) -> Result<Schedule> {
    build_all(project, &[root])
}

/// Build one schedule covering all of `roots`, each requested directly.
/// A task reachable from several roots still gets a single entry.
pub fn build_all(project: &mut Project, roots: &[TaskId]) -> Result<Schedule> {
    let mut builder = Builder {
        project,
        schedule: Schedule::default(),
        stack: Vec::new(),
        on_stack: FxHashSet::default(),
    };
    for &root in roots {
        builder.visit(root, None)?;
    }
    Ok(builder.schedule)
}

impl<'a> Builder<'a> {
    /// `context` is the nearest file task above `id`, if any.
    fn visit(&mut self, id: TaskId, context: Option<TaskId>) -> Result<()> {
        if self.on_stack.contains(&id) {
            return Err(self.cycle_error(id));
        }
        if let Some(status) = self.schedule.status(id) {
            if status.is_final() {
                return Ok(());
            }
        }

        let kind = self.project.graph().task(id).kind;
        let prereqs = self.project.graph().prereq_tasks(id);
        let next_context = match kind {
            TaskKind::File => Some(id),
            TaskKind::Phony => context,
        };

        self.stack.push(id);
        self.on_stack.insert(id);
        for &prereq in &prereqs {
            self.visit(prereq, next_context)?;
        }
        self.stack.pop();
        self.on_stack.remove(&id);

        let (status, explain) = self.decide(id, kind, context, &prereqs)?;
        if status == RunStatus::Yes {
            for &prereq in &prereqs {
                self.force_run(prereq, id);
            }
        }
        self.schedule.record(id, status, explain);
        Ok(())
    }

    fn decide(
        &mut self,
        id: TaskId,
        kind: TaskKind,
        context: Option<TaskId>,
        prereqs: &[TaskId],
    ) -> Result<(RunStatus, Explain)> {
        let reference = match (kind, context) {
            (TaskKind::File, _) => id,
            (TaskKind::Phony, Some(file_task)) => file_task,
            (TaskKind::Phony, None) => {
                debug_assert!(kind.propagates_when_unforced());
                return Ok((RunStatus::Yes, Explain::RootPhony));
            }
        };

        for &prereq in prereqs {
            if self.schedule.status(prereq) == Some(RunStatus::Yes) {
                return Ok((RunStatus::Yes, Explain::PrereqRunning(prereq)));
            }
        }

        let sources = self.sources(id);
        let outputs = self.project.target_paths(reference);
        Ok(match self.project.staleness(&outputs, &sources)? {
            Staleness::Fresh => match kind {
                TaskKind::File => (RunStatus::NoFinal, Explain::UpToDate),
                TaskKind::Phony => (RunStatus::NoTentative, Explain::UpToDate),
            },
            Staleness::MissingOutput(path) => (RunStatus::Yes, Explain::OutputMissing(path)),
            Staleness::Newer { input, output } => {
                (RunStatus::Yes, Explain::Outdated { input, output })
            }
        })
    }

    /// Paths a task's outputs are compared against: the files produced by
    /// its file-task prerequisites plus any external files it names.
    /// Phony prerequisites contribute nothing.
    fn sources(&self, id: TaskId) -> Vec<PathBuf> {
        let graph = self.project.graph();
        let mut seen = FxHashSet::default();
        let mut sources = Vec::new();
        for prereq in &graph.task(id).prereqs {
            match graph.find_task(prereq) {
                Some(t) => {
                    for target in graph.task(t).target_files() {
                        let path = self.project.resolve(target);
                        if seen.insert(path.clone()) {
                            sources.push(path);
                        }
                    }
                }
                None => {
                    let path = self.project.resolve(prereq);
                    if seen.insert(path.clone()) {
                        sources.push(path);
                    }
                }
            }
        }
        sources
    }

    /// Make `id` run because `by` runs.  Cascades through phony tasks and
    /// stops at file tasks, whose verdict was settled by their own mtimes.
    fn force_run(&mut self, id: TaskId, by: TaskId) {
        if self.project.graph().task(id).kind == TaskKind::File {
            return;
        }
        if !self.schedule.upgrade(id, by) {
            return;
        }
        for prereq in self.project.graph().prereq_tasks(id) {
            self.force_run(prereq, by);
        }
    }

    fn cycle_error(&self, id: TaskId) -> Error {
        let graph = self.project.graph();
        let start = self.stack.iter().position(|&t| t == id).unwrap_or(0);
        let cycle = self.stack[start..]
            .iter()
            .chain(std::iter::once(&id))
            .map(|&t| graph.task(t).name().to_string())
            .collect();
        Error::CyclicDependency { cycle }
    }
}
