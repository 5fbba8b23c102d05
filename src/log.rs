//! Diagnostic sink for the target model.
//!
//! The host that consumes extracted entities usually has its own output
//! window. [`ModelLog`] is that window: extraction hands it timestamped
//! lines and never looks at what happens to them.

use std::sync::Arc;

use parking_lot::Mutex;

/// Receiver of diagnostic lines.
pub trait ModelLog: Send + Sync {
    /// Record one line. Must not panic.
    fn log(&self, line: &str);
}

impl<T: ModelLog + ?Sized> ModelLog for Arc<T> {
    fn log(&self, line: &str) {
        (**self).log(line)
    }
}

/// Prefix a line with the local wall-clock time, e.g. `14:02:11 Getting ...`.
pub fn timestamped(line: &str) -> String {
    format!("{} {}", chrono::Local::now().format("%H:%M:%S"), line)
}

/// Forwards lines to `tracing` under the `mdzip::model` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ModelLog for TracingLog {
    fn log(&self, line: &str) {
        tracing::info!(target: "mdzip::model", "{line}");
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines logged so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl ModelLog for MemoryLog {
    fn log(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
