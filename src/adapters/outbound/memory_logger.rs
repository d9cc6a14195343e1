use crate::domains::logger::DomainLogger;
use std::sync::{Arc, Mutex};

/// Keeps every line in memory, tagged with its level. Handy for asserting on
/// what the scheduler reported.
#[derive(Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }

    fn push(&self, level: &str, msg: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(format!("{}:{}", level, msg));
        }
    }
}

impl DomainLogger for MemoryLogger {
    fn info(&self, msg: &str) { self.push("INFO", msg); }
    fn warn(&self, msg: &str) { self.push("WARN", msg); }
    fn error(&self, msg: &str) { self.push("ERROR", msg); }
}

struct Discard;

impl DomainLogger for Discard {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

/// Logger that drops everything; the default for tests that do not care.
pub fn init_noop_logger() -> Arc<dyn DomainLogger> {
    Arc::new(Discard)
}
