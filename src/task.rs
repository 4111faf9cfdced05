//! Runs task actions: shell commands or in-process functions.
//! Unaware of the schedule; just action execution.

use crate::graph::Action;
use std::path::Path;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Termination {
    Success,
    Interrupted,
    Failure,
}

/// The result of executing an action.
#[derive(Debug)]
pub struct TaskResult {
    pub termination: Termination,
    /// Console output.
    pub output: Vec<u8>,
}

impl TaskResult {
    pub fn success(&self) -> bool {
        self.termination == Termination::Success
    }
}

/// Executes a command line through the shell, in `dir` if non-empty.
/// Returns an Err() if we failed outside of the process itself.
fn run_command(cmdline: &str, dir: &Path) -> std::io::Result<TaskResult> {
    #[cfg(unix)]
    let mut cmd = {
        let mut cmd = std::process::Command::new("/bin/sh");
        cmd.arg("-c").arg(cmdline);
        cmd
    };
    #[cfg(windows)]
    let mut cmd = {
        let mut cmd = std::process::Command::new("cmd");
        cmd.arg("/c").arg(cmdline);
        cmd
    };
    if !dir.as_os_str().is_empty() {
        cmd.current_dir(dir);
    }
    let mut out = cmd.output()?;

    let mut output = Vec::new();
    output.append(&mut out.stdout);
    output.append(&mut out.stderr);

    #[allow(unused_mut)]
    let mut termination = if out.status.success() {
        Termination::Success
    } else {
        Termination::Failure
    };
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = out.status.signal() {
            // SIGINT
            if sig == 2 {
                termination = Termination::Interrupted;
                write!(output, "interrupted")?;
            } else {
                write!(output, "signal {}", sig)?;
            }
        }
    }
    Ok(TaskResult {
        termination,
        output,
    })
}

/// Runs an action, folding every way it can fail into the result.
pub fn run_action(action: &Action, dir: &Path) -> TaskResult {
    match action {
        Action::Command(cmdline) => run_command(cmdline, dir).unwrap_or_else(|err| TaskResult {
            termination: Termination::Failure,
            output: err.to_string().into_bytes(),
        }),
        Action::Func(f) => match f() {
            Ok(()) => TaskResult {
                termination: Termination::Success,
                output: Vec::new(),
            },
            Err(err) => TaskResult {
                termination: Termination::Failure,
                output: format!("{:#}", err).into_bytes(),
            },
        },
    }
}
