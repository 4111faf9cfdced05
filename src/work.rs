//! Runs a schedule: invokes the actions of the tasks that need to run, one
//! at a time, in schedule order.

use crate::error::{Error, Result};
use crate::graph::{TaskId, TaskKind};
use crate::progress::Progress;
use crate::project::Project;
use crate::schedule::{Entry, Explain, RunStatus, Schedule};
use crate::{schedule, task, trace};

#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Report what would run without running anything.
    pub dry_run: bool,
    /// Log the reason behind every verdict before running.
    pub explain: bool,
}

pub struct Work<'a> {
    project: &'a mut Project,
    progress: &'a mut dyn Progress,
    options: &'a Options,
}

impl<'a> Work<'a> {
    pub fn new(
        project: &'a mut Project,
        progress: &'a mut dyn Progress,
        options: &'a Options,
    ) -> Self {
        Work {
            project,
            progress,
            options,
        }
    }

    /// Bring `roots` up to date.  Returns the number of actions run.
    pub fn run(&mut self, roots: &[TaskId]) -> Result<usize> {
        let schedule = trace::scope("schedule::build", || {
            schedule::build_all(self.project, roots)
        })?;
        if self.options.explain {
            self.explain(&schedule);
        }
        trace::scope("work.run", || self.execute(&schedule))
    }

    fn execute(&mut self, schedule: &Schedule) -> Result<usize> {
        let mut ran = 0;
        for id in schedule.to_run() {
            let task = self.project.graph().task(id);
            let action = match &task.action {
                None => continue,
                Some(action) => action,
            };
            self.progress.task_started(id, task);
            ran += 1;
            if self.options.dry_run {
                continue;
            }

            let result = task::run_action(action, self.project.root());
            self.progress.task_finished(id, task, &result);
            if !result.success() {
                return Err(Error::ActionFailed {
                    task: task.name().to_string(),
                    message: String::from_utf8_lossy(&result.output).trim_end().to_string(),
                });
            }

            if task.kind == TaskKind::File {
                self.project.refresh(id)?;
            }
        }
        Ok(ran)
    }

    fn explain(&mut self, schedule: &Schedule) {
        for entry in schedule.entries() {
            let msg = describe(self.project, entry);
            self.progress.log(&msg);
        }
    }
}

fn describe(project: &Project, entry: &Entry) -> String {
    let graph = project.graph();
    let name = graph.task(entry.task).name();
    let verdict = match entry.status {
        RunStatus::Yes => "run",
        RunStatus::NoFinal | RunStatus::NoTentative => "skip",
    };
    let why = match &entry.explain {
        Explain::RootPhony => "phony target requested directly".to_string(),
        Explain::PrereqRunning(t) => format!("prerequisite {} runs", graph.task(*t).name()),
        Explain::OutputMissing(path) => format!("output {} missing", path.display()),
        Explain::Outdated { input, output } => {
            format!("input {} newer than output {}", input.display(), output.display())
        }
        Explain::Forced(t) => format!("needed by {}", graph.task(*t).name()),
        Explain::UpToDate => "up to date".to_string(),
    };
    format!("explain: {} {}: {}", verdict, name, why)
}
