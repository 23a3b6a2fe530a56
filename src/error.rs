//! Error types for rgraph-exec.

use thiserror::Error;

use crate::engine::ExecResult;

#[derive(Debug, Error)]
pub enum Error {
    /// An action's `run` failed. Its events are not considered produced.
    #[error("action {action} failed: {message}")]
    Action { action: String, message: String },

    #[error("context cancelled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// One or more actions failed during an execution. Actions that were
    /// waiting on their events are listed as pending in the result.
    #[error("{} action(s) failed, {} left pending", .0.failed.len(), .0.pending.len())]
    ActionsFailed(Box<ExecResult>),

    /// No action failed, but blocked actions remain with nothing left to run.
    #[error("unsatisfiable graph: {} action(s) blocked with no runnable action", .0.pending.len())]
    Unsatisfiable(Box<ExecResult>),

    #[error("plan error: {0}")]
    Plan(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// An action task ended without returning, e.g. it panicked.
    #[error("task join error: {0}")]
    Join(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// The partial execution result carried by executor-level failures.
    pub fn exec_result(&self) -> Option<&ExecResult> {
        match self {
            Error::ActionsFailed(result) | Error::Unsatisfiable(result) => Some(result),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
