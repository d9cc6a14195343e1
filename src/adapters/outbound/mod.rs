pub mod buffered_logger;
pub mod console_logger;
pub mod file_logger;
pub mod memory_logger;
pub mod multi_logger;
pub mod snapshot_sinks;

pub use buffered_logger::*;
pub use console_logger::*;
pub use file_logger::*;
pub use memory_logger::*;
pub use multi_logger::*;
pub use snapshot_sinks::*;
