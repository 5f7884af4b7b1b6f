//! Diagnostic log sinks
//!
//! The fixer reports what it sees through a [`LogSink`] handed to it by the
//! caller. A sink accepts plain lines and returns nothing: it cannot fail from
//! the caller's point of view, so a sink backed by something fallible (a file)
//! drops its own errors.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Tracing target used by [`TracingSink`].
pub const LOG_TARGET: &str = "wp_button_fix";

/// Append-only destination for diagnostic lines.
pub trait LogSink: Send + Sync {
    fn log(&self, line: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, line: &str) {
        self(line)
    }
}

/// Discards every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _line: &str) {}
}

/// Forwards lines as `tracing` debug events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, line: &str) {
        tracing::debug!(target: LOG_TARGET, "{}", line);
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines logged so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// All lines joined with newlines.
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }
}

impl LogSink for MemorySink {
    fn log(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Appends lines to a file, one per line.
///
/// The file is opened per line in append mode. Open and write failures are
/// ignored.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl LogSink for FileSink {
    fn log(&self, line: &str) {
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            let _ = writeln!(file, "{}", line);
        }
    }
}

/// Sends every line to each of its sinks in turn.
#[derive(Default)]
pub struct TeeSink {
    sinks: Vec<Box<dyn LogSink>>,
}

impl TeeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl LogSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl LogSink for TeeSink {
    fn log(&self, line: &str) {
        for sink in &self.sinks {
            sink.log(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.log("one");
        sink.log("two");
        assert_eq!(sink.lines(), vec!["one", "two"]);
        assert_eq!(sink.contents(), "one\ntwo");
    }

    #[test]
    fn test_closure_is_a_sink() {
        let count = AtomicUsize::new(0);
        let sink = |_: &str| {
            count.fetch_add(1, Ordering::SeqCst);
        };
        sink.log("a");
        LogSink::log(&sink, "b");
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");
        let sink = FileSink::new(&path);
        sink.log("first");
        sink.log("second");
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "first\nsecond\n");
    }

    #[test]
    fn test_file_sink_swallows_errors() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let sink = FileSink::new(dir.path());
        sink.log("dropped");
    }

    #[test]
    fn test_tee_sink_fans_out() {
        let first = Arc::new(MemorySink::new());
        let second = Arc::new(MemorySink::new());
        let (a, b) = (first.clone(), second.clone());
        let tee = TeeSink::new()
            .with(move |line: &str| a.log(line))
            .with(move |line: &str| b.log(line));
        tee.log("hello");
        assert_eq!(first.lines(), vec!["hello"]);
        assert_eq!(second.lines(), vec!["hello"]);
    }
}
