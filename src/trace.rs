//! Chrome trace output, for `-d trace`.

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

thread_local! {
    static TRACE: RefCell<Option<Trace>> = RefCell::new(None);
}

struct Trace {
    start: Instant,
    w: BufWriter<File>,
}

impl Trace {
    fn new(path: &str) -> std::io::Result<Self> {
        let mut w = BufWriter::new(File::create(path)?);
        writeln!(w, "[")?;
        Ok(Trace {
            start: Instant::now(),
            w,
        })
    }

    /// Write a "complete" event spanning start..end.
    fn write_complete(&mut self, name: &str, start: Instant, end: Instant) -> std::io::Result<()> {
        write!(
            self.w,
            "{{ \"pid\": 0, \"name\": {:?}, \"ts\": {}, \"ph\": \"X\", \"dur\": {} }}",
            name,
            start.duration_since(self.start).as_micros(),
            end.duration_since(start).as_micros(),
        )
    }

    fn close(&mut self) -> std::io::Result<()> {
        self.write_complete("main", self.start, Instant::now())?;
        writeln!(self.w, "]")?;
        self.w.flush()
    }
}

pub fn open(path: &str) -> std::io::Result<()> {
    let trace = Trace::new(path)?;
    TRACE.with(|t| *t.borrow_mut() = Some(trace));
    Ok(())
}

fn enabled() -> bool {
    TRACE.with(|t| t.borrow().is_some())
}

/// Run `f`, recording its duration under `name` if tracing is on.
#[inline]
pub fn scope<T>(name: &'static str, f: impl FnOnce() -> T) -> T {
    if !enabled() {
        return f();
    }
    let start = Instant::now();
    let result = f();
    let end = Instant::now();
    TRACE.with(|t| {
        if let Some(trace) = t.borrow_mut().as_mut() {
            // Best-effort.
            let _ = trace
                .write_complete(name, start, end)
                .and_then(|_| writeln!(trace.w, ","));
        }
    });
    result
}

pub fn close() -> std::io::Result<()> {
    TRACE.with(|t| match t.borrow_mut().take() {
        Some(mut trace) => trace.close(),
        None => Ok(()),
    })
}
