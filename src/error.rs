//! Errors surfaced while scheduling and running tasks.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A requested target is not produced by any declared task.
    #[error("unknown target {0:?}")]
    UnresolvedTarget(String),

    /// An input of a task was compared against its outputs but doesn't exist.
    #[error("input {} missing", .0.display())]
    MissingInput(PathBuf),

    /// stat() failed for some reason other than the file being absent.
    #[error("stat {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A task's action ran and failed; the rest of the schedule was abandoned.
    #[error("{task} failed: {message}")]
    ActionFailed { task: String, message: String },

    /// The prerequisites of a task lead back to the task itself.
    /// The cycle lists target names, starting and ending with the same task.
    #[error("dependency cycle: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
}

pub type Result<T> = std::result::Result<T, Error>;
