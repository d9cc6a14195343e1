use crate::domains::path_planning::Coord;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MotionError {
    #[error("No pending path to advance along")]
    PathExhausted,

    #[error("Step from {from} to {to} is not 4-adjacent")]
    NonAdjacentStep { from: Coord, to: Coord },
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid map: {reason}")]
    InvalidMap { reason: String },

    #[error("Invalid task: {reason}")]
    InvalidTask { reason: String },

    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error("AGV not found: {id}")]
    AgvNotFound { id: u32 },

    #[error("Task not found: {id}")]
    TaskNotFound { id: u64 },

    #[error("Motion rejected: {0}")]
    Motion(#[from] MotionError),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Snapshot sink error: {0}")]
    Sink(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
