//! Events: the facts actions wait on and produce.
//!
//! An action declares the events it needs before it can run. Any other
//! action may produce a matching event; the executor broadcasts produced
//! events to every pending action. Events are compared structurally, so
//! producers and consumers never reference each other directly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cloud::ResourceId;

/// An immutable fact. Two events are equal iff they are the same variant
/// with equal payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// A generic string-tagged fact.
    String(String),
    /// The resource is known to exist.
    Exists(ResourceId),
    /// The resource is known to be absent.
    NotExists(ResourceId),
    /// `from` no longer holds a reference to `to`.
    DropRef { from: ResourceId, to: ResourceId },
}

impl Event {
    pub fn string(s: impl Into<String>) -> Self {
        Event::String(s.into())
    }

    pub fn exists(id: ResourceId) -> Self {
        Event::Exists(id)
    }

    pub fn not_exists(id: ResourceId) -> Self {
        Event::NotExists(id)
    }

    pub fn drop_ref(from: ResourceId, to: ResourceId) -> Self {
        Event::DropRef { from, to }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::String(s) => write!(f, "StringEvent({s})"),
            Event::Exists(id) => write!(f, "Exists({id})"),
            Event::NotExists(id) => write!(f, "NotExists({id})"),
            Event::DropRef { from, to } => write!(f, "DropRef({from} => {to})"),
        }
    }
}

/// Renders a sequence of events as `[e1 e2 ...]`.
///
/// Used by action `Display` impls and plan output; the format is stable.
pub struct EventList<'a>(pub &'a [Event]);

impl fmt::Display for EventList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, event) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{event}")?;
        }
        f.write_str("]")
    }
}
