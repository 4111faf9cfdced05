pub mod canon;
pub mod error;
pub mod fs;
pub mod graph;
pub mod load;
pub mod mtime;
pub mod parse;
pub mod progress;
pub mod project;
pub mod run;
pub mod scanner;
pub mod schedule;
pub mod task;
pub mod trace;
pub mod work;

pub use error::{Error, Result};
pub use project::Project;

#[cfg(not(any(windows, target_arch = "wasm32")))]
use jemallocator::Jemalloc;

#[cfg(not(any(windows, target_arch = "wasm32")))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;
