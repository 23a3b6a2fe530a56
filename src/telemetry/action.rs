//! Execution span helpers.
//!
//! Provides span creation and state-transition recording for executions
//! and the actions flowing through them.

use tracing::Span;
use uuid::Uuid;

/// Start a span covering one executor run.
///
/// `project_id` comes from the cloud handle, when the run has one.
pub fn start_exec_span(
    run_id: &Uuid,
    actions: usize,
    dry_run: bool,
    project_id: Option<&str>,
) -> Span {
    tracing::info_span!(
        "rgraph.exec",
        "exec.id" = %run_id,
        "exec.actions" = actions,
        "exec.dry_run" = dry_run,
        "cloud.project_id" = project_id,
    )
}

/// Start a span for a single action execution.
///
/// The `action.state` field is declared empty and can be updated via
/// [`record_state_transition`].
pub fn start_action_span(name: &str, action_type: &str) -> Span {
    tracing::info_span!(
        "rgraph.action",
        "action.name" = name,
        "action.type" = action_type,
        "action.state" = tracing::field::Empty,
    )
}

/// Record a state transition event on the given span.
pub fn record_state_transition(span: &Span, from: &str, to: &str) {
    span.record("action.state", to);
    span.in_scope(|| {
        tracing::info!(from = from, to = to, "state_transition");
    });
}
