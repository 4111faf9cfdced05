//! A project: the declared tasks, the project root, and the timestamp store.
//! Everything one build invocation needs, with no global state.

use crate::canon;
use crate::error::{Error, Result};
use crate::fs::{FileSystem, MTime};
use crate::graph::{Action, Graph, Task, TaskId, TaskKind};
use crate::mtime::MTimes;
use crate::progress::Progress;
use crate::schedule::{self, Schedule};
use crate::work::{Options, Work};
use std::path::{Path, PathBuf};

/// The result of comparing a set of outputs against a set of inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    /// An output doesn't exist yet.
    MissingOutput(PathBuf),
    /// An input was modified after an output.
    Newer { input: PathBuf, output: PathBuf },
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        !matches!(self, Staleness::Fresh)
    }
}

pub struct Project {
    root: PathBuf,
    graph: Graph,
    mtimes: MTimes,
}

impl Project {
    /// Create an empty project.  Relative paths, both external inputs and
    /// file task targets, are resolved against `root`.
    pub fn new(root: impl Into<PathBuf>, fs: Box<dyn FileSystem>) -> Self {
        Project {
            root: root.into(),
            graph: Graph::new(),
            mtimes: MTimes::new(fs),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn add_task(&mut self, task: Task) -> TaskId {
        self.graph.add_task(task)
    }

    pub fn add_file_task<T, P>(&mut self, targets: T, prereqs: P, action: Option<Action>) -> TaskId
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        self.declare(TaskKind::File, targets, prereqs, action)
    }

    pub fn add_phony_task<T, P>(
        &mut self,
        targets: T,
        prereqs: P,
        action: Option<Action>,
    ) -> TaskId
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        self.declare(TaskKind::Phony, targets, prereqs, action)
    }

    fn declare<T, P>(
        &mut self,
        kind: TaskKind,
        targets: T,
        prereqs: P,
        action: Option<Action>,
    ) -> TaskId
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let mut task = Task::new(
            kind,
            targets.into_iter().map(|t| t.as_ref().to_string()).collect(),
            prereqs.into_iter().map(|p| p.as_ref().to_string()).collect(),
        );
        task.action = action;
        self.graph.add_task(task)
    }

    pub fn find_task(&self, target: &str) -> Option<TaskId> {
        self.graph.find_task(target)
    }

    /// The on-disk path for a target identifier.
    pub fn resolve(&self, target: &str) -> PathBuf {
        canon::resolve(&self.root, target)
    }

    /// On-disk paths of the files a task produces.
    pub fn target_paths(&self, id: TaskId) -> Vec<PathBuf> {
        self.graph
            .task(id)
            .target_files()
            .iter()
            .map(|t| self.resolve(t))
            .collect()
    }

    /// Whether `outputs` need to be regenerated from `inputs`.
    pub fn is_stale(&mut self, outputs: &[PathBuf], inputs: &[PathBuf]) -> Result<bool> {
        Ok(self.staleness(outputs, inputs)?.is_stale())
    }

    /// Compare outputs against inputs.  Any missing output is stale.
    /// Otherwise stale iff some input is strictly newer than some output;
    /// with no inputs nothing is stale.  A missing input is an error.
    pub fn staleness(&mut self, outputs: &[PathBuf], inputs: &[PathBuf]) -> Result<Staleness> {
        let mut oldest: Option<(&PathBuf, std::time::SystemTime)> = None;
        for output in outputs {
            match self.mtimes.time_of(output)? {
                MTime::Missing => return Ok(Staleness::MissingOutput(output.clone())),
                MTime::Stamp(t) => {
                    if oldest.map_or(true, |(_, o)| t < o) {
                        oldest = Some((output, t));
                    }
                }
            }
        }

        // All inputs must exist even if an early one already shows staleness.
        let mut input_times = Vec::with_capacity(inputs.len());
        for input in inputs {
            match self.mtimes.time_of(input)? {
                MTime::Missing => return Err(Error::MissingInput(input.clone())),
                MTime::Stamp(t) => input_times.push((input, t)),
            }
        }

        // An input newer than any output is newer than the oldest one.
        let (output, oldest) = match oldest {
            None => return Ok(Staleness::Fresh),
            Some(o) => o,
        };
        for (input, t) in input_times {
            if t > oldest {
                return Ok(Staleness::Newer {
                    input: input.clone(),
                    output: output.clone(),
                });
            }
        }
        Ok(Staleness::Fresh)
    }

    /// Re-stat the files a task produces after it ran.
    pub fn refresh(&mut self, id: TaskId) -> Result<()> {
        let paths = self.target_paths(id);
        self.mtimes.refresh(&paths)
    }

    /// Decide what needs to run to bring `root` up to date.
    pub fn schedule(&mut self, root: TaskId) -> Result<Schedule> {
        schedule::build(self, root)
    }

    /// Find the tasks for `targets`, failing on the first unknown one.
    pub fn resolve_targets<S: AsRef<str>>(&self, targets: &[S]) -> Result<Vec<TaskId>> {
        targets
            .iter()
            .map(|t| {
                let t = t.as_ref();
                self.find_task(t)
                    .ok_or_else(|| Error::UnresolvedTarget(t.to_string()))
            })
            .collect()
    }

    /// Bring a target up to date, returning the number of actions run.
    pub fn run(
        &mut self,
        target: &str,
        progress: &mut dyn Progress,
        options: &Options,
    ) -> Result<usize> {
        let id = self.resolve_targets(&[target])?;
        self.run_tasks(&id, progress, options)
    }

    /// Bring several tasks up to date with a single schedule, so work
    /// shared between them runs once.
    pub fn run_tasks(
        &mut self,
        ids: &[TaskId],
        progress: &mut dyn Progress,
        options: &Options,
    ) -> Result<usize> {
        Work::new(self, progress, options).run(ids)
    }
}
