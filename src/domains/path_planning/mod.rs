pub mod astar;
pub mod grid;
pub mod validity;

pub use astar::*;
pub use grid::*;
pub use validity::*;
