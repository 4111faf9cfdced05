//! Build progress reporting, for the purpose of display to the user.

use crate::graph::{Action, Task, TaskId};
use crate::task::{TaskResult, Termination};
use std::io::Write;

/// Compute the message to display on the console for a given task.
pub fn task_message(task: &Task) -> &str {
    task.name()
}

/// Trait for build progress notifications.
pub trait Progress {
    /// Called when a task's action starts.
    fn task_started(&mut self, id: TaskId, task: &Task);

    /// Called when a task's action completes.
    fn task_finished(&mut self, id: TaskId, task: &Task, result: &TaskResult);

    /// Log a line of output, e.g. for `-d explain`.
    fn log(&mut self, msg: &str);
}

/// Progress implementation for a plain console, one line per task.
#[derive(Default)]
pub struct DumbConsoleProgress {
    /// Whether to print command lines of started programs.
    verbose: bool,

    /// The id of the last task printed, used to avoid printing it twice
    /// when it finishes right after starting.
    last_started: Option<TaskId>,
}

impl DumbConsoleProgress {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            last_started: None,
        }
    }
}

impl Progress for DumbConsoleProgress {
    fn task_started(&mut self, id: TaskId, task: &Task) {
        let msg = match (&task.action, self.verbose) {
            (Some(Action::Command(cmdline)), true) => cmdline.as_str(),
            _ => task_message(task),
        };
        self.log(msg);
        self.last_started = Some(id);
    }

    fn task_finished(&mut self, id: TaskId, task: &Task, result: &TaskResult) {
        match result.termination {
            Termination::Success => {
                if result.output.is_empty() || self.last_started == Some(id) {
                    // Output is empty, or we just printed the task, don't print it again.
                } else {
                    self.log(task_message(task))
                }
            }
            Termination::Interrupted => self.log(&format!("interrupted: {}", task_message(task))),
            Termination::Failure => match &task.location {
                Some(loc) => self.log(&format!("failed: {} ({})", task_message(task), loc)),
                None => self.log(&format!("failed: {}", task_message(task))),
            },
        };
        if !result.output.is_empty() {
            let mut stdout = std::io::stdout();
            // Best-effort.
            let _ = stdout.write_all(&result.output);
            let _ = stdout.flush();
        }
    }

    fn log(&mut self, msg: &str) {
        println!("{}", msg);
    }
}
