//! The action contract.
//!
//! An action is a schedulable unit of work. It declares the events it must
//! observe before it may run and returns the events it produced when it
//! runs. There are no explicit edges between actions: the executor simply
//! delivers every produced event to every pending action via
//! [`Action::signal`].
//!
//! Concrete actions compose an [`ActionBase`] for the wait/done bookkeeping
//! and expose it through [`Action::base`]; `can_run`, `signal` and
//! `pending_events` then come for free.

pub mod base;
pub mod event_action;

pub use base::ActionBase;
pub use event_action::EventAction;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cloud::Cloud;
use crate::context::RunContext;
use crate::error::Result;
use crate::event::Event;

/// Kind of an action, for plans and traces. Has no effect on scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Create,
    Update,
    Delete,
    /// Asserts existence (or absence) of a resource without touching it.
    Exists,
    /// Pure synchronization point with no side effect.
    Meta,
    #[default]
    Custom,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionType::Create => "create",
            ActionType::Update => "update",
            ActionType::Delete => "delete",
            ActionType::Exists => "exists",
            ActionType::Meta => "meta",
            ActionType::Custom => "custom",
        };
        f.pad(s)
    }
}

/// Descriptive record for execution plans and traces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMetadata {
    /// Human identifier. Usually includes the action's parameters.
    pub name: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Free text for operators.
    pub summary: String,
}

/// Operations every schedulable unit of work supports.
///
/// `Display` is the action's stable rendering for logs and graph output.
#[async_trait]
pub trait Action: fmt::Display + Send + Sync {
    /// The wait/done state this action composes.
    fn base(&self) -> &ActionBase;

    /// Events `run` would produce, computed without side effects.
    fn dry_run(&self) -> Vec<Event>;

    /// Perform the action.
    ///
    /// On error the action's events are not considered produced. Blocking
    /// I/O should honour `ctx` and return promptly once it is done.
    async fn run(&self, ctx: &RunContext, cloud: Option<&dyn Cloud>) -> Result<Vec<Event>>;

    fn metadata(&self) -> ActionMetadata;

    /// True once every wanted event has been signaled.
    fn can_run(&self) -> bool {
        self.base().can_run()
    }

    /// Deliver an event. Returns true iff it satisfied an outstanding want.
    fn signal(&self, event: &Event) -> bool {
        self.base().signal(event)
    }

    /// Wanted events not yet signaled, in declaration order.
    fn pending_events(&self) -> Vec<Event> {
        self.base().pending_events()
    }
}
