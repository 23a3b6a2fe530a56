//! Actions with no side effect beyond emitting events.
//!
//! Bridge producers and consumers that have no causal action of their own,
//! e.g. a resource that already exists and will not be touched still needs
//! to unblock the actions that reference it.

use async_trait::async_trait;
use std::fmt;

use super::{Action, ActionBase, ActionMetadata, ActionType};
use crate::cloud::{Cloud, ResourceId};
use crate::context::RunContext;
use crate::error::Result;
use crate::event::{Event, EventList};

/// Waits for `want`, then emits a fixed set of events.
#[derive(Debug)]
pub struct EventAction {
    base: ActionBase,
    events: Vec<Event>,
    action_type: ActionType,
    summary: &'static str,
}

impl EventAction {
    /// A relay that emits `events` once every event in `want` is observed.
    pub fn new(want: impl IntoIterator<Item = Event>, events: Vec<Event>) -> Self {
        Self {
            base: ActionBase::new(want),
            events,
            action_type: ActionType::Meta,
            summary: "Relay events once all wanted events are observed",
        }
    }

    /// Signals that `id` exists. Runnable immediately.
    pub fn exists(id: ResourceId) -> Self {
        Self {
            base: ActionBase::default(),
            events: vec![Event::exists(id)],
            action_type: ActionType::Exists,
            summary: "Signal that the resource exists",
        }
    }

    /// Signals that `id` does not exist. Runnable immediately.
    pub fn does_not_exist(id: ResourceId) -> Self {
        Self {
            base: ActionBase::default(),
            events: vec![Event::not_exists(id)],
            action_type: ActionType::Exists,
            summary: "Signal that the resource does not exist",
        }
    }

    /// The events this action emits.
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventAction({})", EventList(&self.events))
    }
}

#[async_trait]
impl Action for EventAction {
    fn base(&self) -> &ActionBase {
        &self.base
    }

    fn dry_run(&self) -> Vec<Event> {
        self.events.clone()
    }

    async fn run(&self, _ctx: &RunContext, _cloud: Option<&dyn Cloud>) -> Result<Vec<Event>> {
        Ok(self.events.clone())
    }

    fn metadata(&self) -> ActionMetadata {
        ActionMetadata {
            name: self.to_string(),
            action_type: self.action_type,
            summary: self.summary.to_string(),
        }
    }
}
