pub mod agv;
pub mod scheduler;
pub mod task;

// Re-export all public types for convenience
pub use agv::*;
pub use scheduler::Scheduler;
pub use task::*;
