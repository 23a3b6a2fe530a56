//! Per-action execution: state, a single run attempt, and its outcome.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, warn};

use crate::action::Action;
use crate::cloud::Cloud;
use crate::context::RunContext;
use crate::event::{Event, EventList};

/// Where an action stands within one execution.
///
/// `Failed` is distinct from `Blocked`: a failed action ran and produced
/// nothing, while a blocked one never got its preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Waiting on events.
    Blocked,
    /// Preconditions met, not yet launched.
    Runnable,
    Running,
    Completed,
    Failed,
}

impl NodeState {
    /// Still waiting to be launched.
    pub fn is_pending(self) -> bool {
        matches!(self, NodeState::Blocked | NodeState::Runnable)
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeState::Blocked => "blocked",
            NodeState::Runnable => "runnable",
            NodeState::Running => "running",
            NodeState::Completed => "completed",
            NodeState::Failed => "failed",
        };
        f.pad(s)
    }
}

/// Result of one run attempt.
pub(crate) enum NodeResult {
    Completed {
        events: Vec<Event>,
        started_at: DateTime<Utc>,
        duration_ms: u64,
    },
    Failed {
        error: String,
        started_at: DateTime<Utc>,
        duration_ms: u64,
    },
}

/// Run (or dry-run) an action once.
///
/// No executor bookkeeping lock is held here; `run` may block on I/O.
pub(crate) async fn execute(
    action: &dyn Action,
    ctx: &RunContext,
    cloud: Option<&dyn Cloud>,
    dry_run: bool,
) -> NodeResult {
    let started_at = Utc::now();
    let start = Instant::now();

    let outcome = if dry_run {
        Ok(action.dry_run())
    } else {
        action.run(ctx, cloud).await
    };
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(events) => {
            debug!(
                action = %action,
                events = %EventList(&events),
                duration_ms,
                "action produced events"
            );
            NodeResult::Completed {
                events,
                started_at,
                duration_ms,
            }
        }
        Err(e) => {
            warn!(action = %action, error = %e, duration_ms, "action failed");
            NodeResult::Failed {
                error: e.to_string(),
                started_at,
                duration_ms,
            }
        }
    }
}
