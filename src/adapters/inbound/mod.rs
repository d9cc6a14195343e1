pub mod line_commands;

pub use line_commands::*;
