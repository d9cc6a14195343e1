pub mod assignment;
pub mod motion;
pub mod scheduler;

pub use scheduler::*;
