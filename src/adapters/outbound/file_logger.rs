use crate::domains::logger::{DomainLogger, FileLogger};
use std::sync::Arc;

/// Initialize `fast_log` at `path` and hand back a logger the scheduler can take.
pub fn init_file_logger(path: &str, level: log::LevelFilter) -> Result<Arc<dyn DomainLogger>, String> {
    FileLogger::init(path, level).map_err(|e| format!("Failed to initialize fast_log: {}", e))?;
    Ok(Arc::new(FileLogger))
}
