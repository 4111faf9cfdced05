//! The timestamp store: a cache of file modification times, filled lazily
//! and refreshed after tasks rewrite their outputs.

use crate::error::{Error, Result};
use crate::fs::{FileSystem, MTime};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub struct MTimes {
    fs: Box<dyn FileSystem>,
    stamps: FxHashMap<PathBuf, SystemTime>,
}

impl MTimes {
    pub fn new(fs: Box<dyn FileSystem>) -> Self {
        MTimes {
            fs,
            stamps: FxHashMap::default(),
        }
    }

    fn stat(&self, path: &Path) -> Result<MTime> {
        self.fs.stat(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the mtime of `path`, using the cached value if there is one.
    /// Absent files are reported as Missing and not cached, so a later
    /// lookup notices them once they appear.
    pub fn time_of(&mut self, path: &Path) -> Result<MTime> {
        if let Some(&stamp) = self.stamps.get(path) {
            return Ok(MTime::Stamp(stamp));
        }
        let mtime = self.stat(path)?;
        if let MTime::Stamp(stamp) = mtime {
            self.stamps.insert(path.to_path_buf(), stamp);
        }
        Ok(mtime)
    }

    /// Re-stat each path, replacing whatever was cached.
    pub fn refresh(&mut self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            match self.stat(path)? {
                MTime::Stamp(stamp) => {
                    self.stamps.insert(path.clone(), stamp);
                }
                MTime::Missing => {
                    self.stamps.remove(path);
                }
            }
        }
        Ok(())
    }
}
