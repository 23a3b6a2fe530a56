//! Plan files: a declarative set of actions for the `rgraph` CLI.
//!
//! ```toml
//! [[action]]
//! name = "create-backend"
//! type = "create"
//! want = [{ exists = { project_id = "p", resource = "healthChecks", key = { global = "hc" } } }]
//! emit = [{ exists = { project_id = "p", resource = "backendServices", key = { global = "be" } } }]
//!
//! [[exists]]
//! project_id = "p"
//! resource = "healthChecks"
//! key = { global = "hc" }
//! ```
//!
//! `[[exists]]` and `[[not_exists]]` entries become event relays; every
//! `[[action]]` becomes a [`ScriptedAction`].

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::action::{Action, ActionBase, ActionMetadata, ActionType, EventAction};
use crate::cloud::{Cloud, ResourceId};
use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::event::{Event, EventList};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    #[serde(default, rename = "action")]
    pub actions: Vec<ActionSpec>,
    #[serde(default)]
    pub exists: Vec<ResourceId>,
    #[serde(default)]
    pub not_exists: Vec<ResourceId>,
}

/// One scripted action as written in a plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionSpec {
    pub name: String,
    #[serde(default, rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub want: Vec<Event>,
    #[serde(default)]
    pub emit: Vec<Event>,
    /// When set, `run` fails with this message.
    #[serde(default)]
    pub fail: Option<String>,
    /// Simulated latency of `run`.
    #[serde(default)]
    pub delay_ms: u64,
}

impl Plan {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let plan: Plan = toml::from_str(content).map_err(|e| Error::Plan(e.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Plan(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Plan(message) => Error::Plan(format!("{}: {message}", path.display())),
            other => other,
        })
    }

    fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for spec in &self.actions {
            if spec.name.trim().is_empty() {
                return Err(Error::Plan("action name must not be empty".to_string()));
            }
            if !names.insert(spec.name.as_str()) {
                return Err(Error::Plan(format!("duplicate action name: {}", spec.name)));
            }
        }
        Ok(())
    }

    /// Build the actions, relays first.
    pub fn into_actions(self) -> Vec<Arc<dyn Action>> {
        let mut actions: Vec<Arc<dyn Action>> = Vec::new();
        for id in self.exists {
            actions.push(Arc::new(EventAction::exists(id)));
        }
        for id in self.not_exists {
            actions.push(Arc::new(EventAction::does_not_exist(id)));
        }
        for spec in self.actions {
            actions.push(Arc::new(ScriptedAction::new(spec)));
        }
        actions
    }
}

/// An action whose behavior is fully described by its plan entry.
#[derive(Debug)]
pub struct ScriptedAction {
    base: ActionBase,
    spec: ActionSpec,
}

impl ScriptedAction {
    pub fn new(spec: ActionSpec) -> Self {
        Self {
            base: ActionBase::new(spec.want.clone()),
            spec,
        }
    }
}

impl fmt::Display for ScriptedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.spec.name, EventList(&self.spec.emit))
    }
}

#[async_trait]
impl Action for ScriptedAction {
    fn base(&self) -> &ActionBase {
        &self.base
    }

    fn dry_run(&self) -> Vec<Event> {
        self.spec.emit.clone()
    }

    async fn run(&self, ctx: &RunContext, _cloud: Option<&dyn Cloud>) -> Result<Vec<Event>> {
        ctx.check()?;
        if self.spec.delay_ms > 0 {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(self.spec.delay_ms)) => {}
                _ = ctx.done() => return Err(ctx.check().err().unwrap_or(Error::Cancelled)),
            }
        }
        if let Some(message) = &self.spec.fail {
            return Err(Error::Action {
                action: self.spec.name.clone(),
                message: message.clone(),
            });
        }
        Ok(self.spec.emit.clone())
    }

    fn metadata(&self) -> ActionMetadata {
        ActionMetadata {
            name: self.spec.name.clone(),
            action_type: self.spec.action_type,
            summary: self
                .spec
                .summary
                .clone()
                .unwrap_or_else(|| "Scripted action from plan".to_string()),
        }
    }
}
