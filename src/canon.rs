//! Path canonicalization and resolution against the project root.

use std::path::{Path, PathBuf};

/// Lexically canonicalize a path, removing redundant components.
/// Does not access the disk, but only simplifies things like
/// "foo/./bar" => "foo/bar", so that two spellings of the same target
/// name the same task.
pub fn canon_path<T: Into<String>>(inpath: T) -> String {
    let path: String = inpath.into();
    let absolute = path.starts_with('/');

    let mut components: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => match components.last() {
                Some(&last) if last != ".." => {
                    components.pop();
                }
                // Can't back up past the root of an absolute path.
                _ if absolute => {}
                _ => components.push(".."),
            },
            _ => components.push(component),
        }
    }

    let joined = components.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() && !path.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Resolve a target identifier to the on-disk path used for stat().
/// Absolute paths are kept as-is; relative ones are taken relative to `root`.
pub fn resolve(root: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}
