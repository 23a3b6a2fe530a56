//! Executor: drives actions to completion by broadcasting produced events.

pub mod executor;
pub mod node;

pub use executor::{
    CompletedAction, ErrorStrategy, ExecResult, Executor, ExecutorConfig, FailedAction,
    PendingAction,
};
pub use node::NodeState;
