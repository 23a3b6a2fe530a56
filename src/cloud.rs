//! Boundary types supplied by the graph-building layer.
//!
//! The executor core treats resource identifiers as opaque values compared
//! by equality and rendered for diagnostics. The cloud client handle is
//! passed through to actions untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scope of a resource: global, regional or zonal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Global(String),
    Regional { region: String, name: String },
    Zonal { zone: String, name: String },
}

impl Key {
    pub fn global(name: impl Into<String>) -> Self {
        Key::Global(name.into())
    }

    pub fn regional(region: impl Into<String>, name: impl Into<String>) -> Self {
        Key::Regional {
            region: region.into(),
            name: name.into(),
        }
    }

    pub fn zonal(zone: impl Into<String>, name: impl Into<String>) -> Self {
        Key::Zonal {
            zone: zone.into(),
            name: name.into(),
        }
    }

    /// The resource name, without scope.
    pub fn name(&self) -> &str {
        match self {
            Key::Global(name) => name,
            Key::Regional { name, .. } | Key::Zonal { name, .. } => name,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Global(name) => write!(f, "{name}"),
            Key::Regional { region, name } => write!(f, "regions/{region}/{name}"),
            Key::Zonal { zone, name } => write!(f, "zones/{zone}/{name}"),
        }
    }
}

/// Identifies a single cloud resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub project_id: String,
    /// Resource kind, e.g. "backendServices".
    pub resource: String,
    pub key: Key,
}

impl ResourceId {
    pub fn new(project_id: impl Into<String>, resource: impl Into<String>, key: Key) -> Self {
        Self {
            project_id: project_id.into(),
            resource: resource.into(),
            key,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.resource, self.project_id, self.key)
    }
}

/// Handle to a cloud API client.
///
/// Opaque to the executor: it is only handed to [`Action::run`]. Actions
/// that perform no I/O (such as event relays) ignore it.
///
/// [`Action::run`]: crate::action::Action::run
pub trait Cloud: Send + Sync {
    /// Project the client is bound to. Recorded on the execution span.
    fn project_id(&self) -> &str;
}
