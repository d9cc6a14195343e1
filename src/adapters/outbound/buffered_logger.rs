use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;
use tokio::sync::mpsc;

struct LogLine {
    level: log::Level,
    msg: String,
}

struct BufferedLogger {
    sender: mpsc::Sender<LogLine>,
}

impl BufferedLogger {
    fn offer(&self, level: log::Level, msg: &str) {
        // Full buffer: the line is dropped rather than stalling the caller.
        let _ = self.sender.try_send(LogLine { level, msg: msg.to_string() });
    }
}

impl DomainLogger for BufferedLogger {
    fn info(&self, msg: &str) { self.offer(log::Level::Info, msg); }
    fn warn(&self, msg: &str) { self.offer(log::Level::Warn, msg); }
    fn error(&self, msg: &str) { self.offer(log::Level::Error, msg); }
}

/// Moves logging off the scheduling loop. Lines are forwarded to `sink` from a
/// background task; must be called inside a tokio runtime.
pub fn init_buffered_logger(sink: DynLogger, capacity: usize) -> DynLogger {
    let (sender, mut receiver) = mpsc::channel::<LogLine>(capacity.max(1));

    tokio::spawn(async move {
        while let Some(line) = receiver.recv().await {
            match line.level {
                log::Level::Error => sink.error(&line.msg),
                log::Level::Warn => sink.warn(&line.msg),
                _ => sink.info(&line.msg),
            }
        }
    });

    Arc::new(BufferedLogger { sender })
}
