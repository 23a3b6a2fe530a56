//! # rgraph-exec
//!
//! Event-driven executor for reconciling cloud resource graphs.
//!
//! Actions declare the events they must observe before running and return
//! the events they produce. The executor broadcasts produced events to all
//! pending actions, so dependencies are expressed as shared facts instead
//! of explicit graph edges.

pub mod action;
pub mod cloud;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod event;
pub mod plan;
pub mod telemetry;
pub mod trace;

pub use action::{Action, ActionBase, ActionMetadata, ActionType, EventAction};
pub use cloud::{Cloud, Key, ResourceId};
pub use context::{CancelHandle, RunContext};
pub use engine::{ExecResult, Executor, ExecutorConfig};
pub use error::{Error, Result};
pub use event::{Event, EventList};
