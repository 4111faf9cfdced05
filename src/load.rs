//! Manifest loading: parses build.tock and constructs the project from it.

use crate::fs::FileSystem;
use crate::graph::{Action, FileLoc, Task};
use crate::parse::{Parser, Statement};
use crate::project::Project;
use crate::trace;
use anyhow::{anyhow, bail};
use std::path::Path;
use std::rc::Rc;

/// State loaded by read().
pub struct State {
    pub project: Project,
    /// Targets named by `default` statements, in order.
    pub default: Vec<String>,
}

/// Load a manifest, returning the project it declares.  Paths in the
/// manifest are relative to the directory containing it.
pub fn read(fs: Box<dyn FileSystem>, build_filename: &str) -> anyhow::Result<State> {
    let path = Path::new(build_filename);
    let bytes = match trace::scope("fs::read", || fs.read(path)) {
        Ok(b) => b,
        Err(e) => bail!("read {}: {}", path.display(), e),
    };
    let root = path.parent().unwrap_or_else(|| Path::new(""));
    let mut project = Project::new(root, fs);
    let default = trace::scope("parse", || parse_into(&mut project, path, &bytes))?;
    Ok(State { project, default })
}

/// Parse manifest text, adding its tasks to `project`.  Returns the default
/// targets it names.
pub fn parse_into(
    project: &mut Project,
    filename: &Path,
    bytes: &[u8],
) -> anyhow::Result<Vec<String>> {
    let filename = Rc::new(filename.to_path_buf());
    let mut default = Vec::new();
    let mut parser = Parser::new(bytes);
    loop {
        let stmt = match parser
            .read()
            .map_err(|err| anyhow!(parser.format_parse_error(&filename, err)))?
        {
            None => break,
            Some(s) => s,
        };
        match stmt {
            Statement::Task(decl) => {
                let mut task = Task::new(decl.kind, decl.targets, decl.prereqs);
                task.action = decl.command.map(Action::Command);
                task.location = Some(FileLoc {
                    filename: filename.clone(),
                    line: decl.line,
                });
                project.add_task(task);
            }
            Statement::Default(targets) => default.extend(targets),
        }
    }
    Ok(default)
}
