use crate::domains::logger::DomainLogger;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Forwards domain log lines into `tracing`, so they share the subscriber
/// configured in `main`.
struct TracingBridge;

impl DomainLogger for TracingBridge {
    fn info(&self, msg: &str) { tracing::info!(target: "fleet", "{}", msg); }
    fn warn(&self, msg: &str) { tracing::warn!(target: "fleet", "{}", msg); }
    fn error(&self, msg: &str) { tracing::error!(target: "fleet", "{}", msg); }
}

pub fn init_console_logger() -> Arc<dyn DomainLogger> {
    Arc::new(TracingBridge {})
}

/// Install the global `tracing` subscriber (stderr, `RUST_LOG` or `default_filter`).
///
/// The `log` facade is left alone so the `fast_log` file logger can still
/// claim it.
pub fn init_tracing(default_filter: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to install tracing subscriber: {}", e))
}
