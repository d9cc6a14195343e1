use crate::adapters::outbound::{init_console_logger, init_file_logger};
use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;

/// Fans every line out to all attached loggers, in order.
pub struct MultiLogger {
    targets: Vec<DynLogger>,
}

impl MultiLogger {
    pub fn new(targets: Vec<DynLogger>) -> Self {
        Self { targets }
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.error(msg));
    }
}

/// Console (tracing) logger, plus a `fast_log` file when `path` is given and
/// the file logger can be set up. Falls back to console only.
pub fn init_combined_logger(path: Option<&str>, level: log::LevelFilter) -> DynLogger {
    let console = init_console_logger();
    let Some(path) = path else {
        return console;
    };
    match init_file_logger(path, level) {
        Ok(file_logger) => Arc::new(MultiLogger::new(vec![console, file_logger])),
        Err(e) => {
            tracing::warn!("File logging disabled: {}", e);
            console
        }
    }
}
