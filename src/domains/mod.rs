pub mod fleet;
pub mod logger;
pub mod path_planning;

pub use fleet::*;
pub use logger::*;
pub use path_planning::*;
