pub mod fleet_service;

pub use fleet_service::*;
