//! Round-based concurrent executor.
//!
//! Each turn launches every pending action whose `can_run()` holds (up to
//! `max_concurrent` in flight), then waits for one to finish. Events from a
//! completed action are signaled to every other pending action, which may
//! make more actions runnable. Events from a failed action are never
//! broadcast. When nothing is in flight and nothing is runnable, execution
//! ends; leftover blocked actions are reported, never dropped silently.

use chrono::Utc;
use opentelemetry::KeyValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{Instrument, Span, debug, error, info, warn};
use uuid::Uuid;

use super::node::{self, NodeResult, NodeState};
use crate::action::{Action, ActionMetadata};
use crate::cloud::Cloud;
use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::event::{Event, EventList};
use crate::telemetry::action::{record_state_transition, start_action_span, start_exec_span};
use crate::telemetry::metrics;
use crate::trace::{Signaled, TraceEntry, Tracer};

/// What to do once an action fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStrategy {
    /// Launch nothing new; let in-flight actions finish.
    #[default]
    StopOnError,
    /// Keep running everything that can still become runnable.
    ContinueOnError,
}

impl FromStr for ErrorStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "stop" | "stop_on_error" => Ok(ErrorStrategy::StopOnError),
            "continue" | "continue_on_error" => Ok(ErrorStrategy::ContinueOnError),
            _ => Err(Error::Config(format!("unknown error strategy: {s}"))),
        }
    }
}

/// Configuration for an executor run.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Call `dry_run()` instead of `run()`.
    pub dry_run: bool,
    pub error_strategy: ErrorStrategy,
    /// Maximum actions in flight. 1 executes serially.
    pub max_concurrent: usize,
    /// Deadline for the whole execution.
    pub timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            error_strategy: ErrorStrategy::StopOnError,
            max_concurrent: 4,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletedAction {
    pub metadata: ActionMetadata,
    pub events: Vec<Event>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedAction {
    pub metadata: ActionMetadata,
    pub error: String,
    pub duration_ms: u64,
}

/// An action that never ran.
#[derive(Debug, Clone, Serialize)]
pub struct PendingAction {
    pub metadata: ActionMetadata,
    /// `Blocked` if still waiting on events, `Runnable` if execution
    /// stopped before it could be launched.
    pub state: NodeState,
    pub pending_events: Vec<Event>,
}

/// Outcome of an executor run.
#[derive(Debug, Clone, Serialize)]
pub struct ExecResult {
    pub run_id: Uuid,
    pub dry_run: bool,
    /// In completion order.
    pub completed: Vec<CompletedAction>,
    pub failed: Vec<FailedAction>,
    pub pending: Vec<PendingAction>,
}

impl ExecResult {
    fn new(run_id: Uuid, dry_run: bool) -> Self {
        Self {
            run_id,
            dry_run,
            completed: Vec::new(),
            failed: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.pending.is_empty()
    }
}

/// Drives a set of actions to completion. Single use.
pub struct Executor {
    actions: Vec<Arc<dyn Action>>,
    config: ExecutorConfig,
    tracer: Option<Arc<dyn Tracer>>,
}

impl Executor {
    pub fn new(actions: Vec<Arc<dyn Action>>, config: ExecutorConfig) -> Self {
        Self {
            actions,
            config,
            tracer: None,
        }
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Run until every action has finished or nothing more can run.
    ///
    /// # Errors
    ///
    /// - [`Error::ActionsFailed`] if any action failed.
    /// - [`Error::Unsatisfiable`] if no action failed but some stayed blocked.
    /// - [`Error::Cancelled`] / [`Error::DeadlineExceeded`] if `ctx` (or the
    ///   configured timeout) ended the run. In-flight actions are drained
    ///   first.
    ///
    /// The context is only consulted while some action still waits to be
    /// launched. A cancel that lands while the last actions are in flight
    /// reaches them through their own `ctx`; if they fail with it, the run
    /// reports [`Error::ActionsFailed`] carrying their `Cancelled` errors.
    pub async fn run(self, ctx: &RunContext, cloud: Option<Arc<dyn Cloud>>) -> Result<ExecResult> {
        let ctx = match self.config.timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx.clone(),
        };
        let run_id = Uuid::new_v4();
        let span = start_exec_span(
            &run_id,
            self.actions.len(),
            self.config.dry_run,
            cloud.as_deref().map(|c| c.project_id()),
        );
        self.drive(run_id, ctx, cloud).instrument(span).await
    }

    async fn drive(
        self,
        run_id: Uuid,
        ctx: RunContext,
        cloud: Option<Arc<dyn Cloud>>,
    ) -> Result<ExecResult> {
        let dry_run = self.config.dry_run;
        let max_concurrent = self.config.max_concurrent.max(1);
        let metas: Vec<ActionMetadata> = self.actions.iter().map(|a| a.metadata()).collect();

        let mut states = vec![NodeState::Blocked; self.actions.len()];
        let mut spans: HashMap<usize, Span> = HashMap::new();
        let mut tasks: HashMap<tokio::task::Id, usize> = HashMap::new();
        let mut in_flight: JoinSet<(usize, NodeResult)> = JoinSet::new();
        let mut result = ExecResult::new(run_id, dry_run);
        let mut stopping = false;
        let mut interrupted: Option<Error> = None;

        info!(
            actions = self.actions.len(),
            max_concurrent, dry_run, "execution started"
        );

        loop {
            // Only matters while something is still waiting to launch.
            if interrupted.is_none() && states.iter().any(|s| s.is_pending()) {
                if let Err(e) = ctx.check() {
                    warn!(error = %e, "execution interrupted, draining in-flight actions");
                    interrupted = Some(e);
                }
            }

            if !stopping && interrupted.is_none() {
                for (idx, action) in self.actions.iter().enumerate() {
                    if !states[idx].is_pending() || !action.can_run() {
                        continue;
                    }
                    if in_flight.len() >= max_concurrent {
                        states[idx] = NodeState::Runnable;
                        continue;
                    }

                    let span = start_action_span(&metas[idx].name, &metas[idx].action_type.to_string());
                    record_state_transition(&span, &states[idx].to_string(), "running");
                    states[idx] = NodeState::Running;

                    let action = Arc::clone(action);
                    let ctx = ctx.clone();
                    let cloud = cloud.clone();
                    let handle = in_flight.spawn(
                        async move {
                            let outcome =
                                node::execute(action.as_ref(), &ctx, cloud.as_deref(), dry_run).await;
                            (idx, outcome)
                        }
                        .instrument(span.clone()),
                    );
                    tasks.insert(handle.id(), idx);
                    spans.insert(idx, span);
                }
            }

            let Some(joined) = in_flight.join_next_with_id().await else {
                break;
            };
            let (idx, outcome) = match joined {
                Ok((id, (idx, outcome))) => {
                    tasks.remove(&id);
                    (idx, outcome)
                }
                Err(e) => {
                    let Some(idx) = tasks.remove(&e.id()) else {
                        error!(error = %e, "untracked action task ended");
                        continue;
                    };
                    (
                        idx,
                        NodeResult::Failed {
                            error: Error::Join(format!("action task aborted: {e}")).to_string(),
                            started_at: Utc::now(),
                            duration_ms: 0,
                        },
                    )
                }
            };

            let meta = &metas[idx];
            let span = spans.remove(&idx).unwrap_or_else(Span::none);
            let type_label = KeyValue::new("type", meta.action_type.to_string());
            let dry_run_label = KeyValue::new("dry_run", dry_run);

            match outcome {
                NodeResult::Completed {
                    events,
                    started_at,
                    duration_ms,
                } => {
                    states[idx] = NodeState::Completed;
                    record_state_transition(&span, "running", "completed");

                    let signaled = self.broadcast(idx, &events, &states, &metas);
                    info!(
                        action = %meta.name,
                        events = %EventList(&events),
                        consumed = signaled.len(),
                        duration_ms,
                        "action completed"
                    );

                    metrics::actions_executed().add(
                        1,
                        &[type_label.clone(), KeyValue::new("result", "ok"), dry_run_label],
                    );
                    metrics::action_duration_ms().record(duration_ms as f64, &[type_label]);

                    if let Some(tracer) = &self.tracer {
                        tracer.record(TraceEntry {
                            node: idx,
                            action: meta.clone(),
                            started_at,
                            finished_at: Utc::now(),
                            error: None,
                            signaled,
                        });
                    }
                    result.completed.push(CompletedAction {
                        metadata: meta.clone(),
                        events,
                        duration_ms,
                    });
                }
                NodeResult::Failed {
                    error,
                    started_at,
                    duration_ms,
                } => {
                    states[idx] = NodeState::Failed;
                    record_state_transition(&span, "running", "failed");
                    error!(action = %meta.name, %error, duration_ms, "action failed, events withheld");

                    metrics::actions_executed().add(
                        1,
                        &[type_label.clone(), KeyValue::new("result", "error"), dry_run_label],
                    );
                    metrics::action_duration_ms().record(duration_ms as f64, &[type_label]);

                    if self.config.error_strategy == ErrorStrategy::StopOnError && !stopping {
                        warn!("stopping execution after first failure");
                        stopping = true;
                    }

                    if let Some(tracer) = &self.tracer {
                        tracer.record(TraceEntry {
                            node: idx,
                            action: meta.clone(),
                            started_at,
                            finished_at: Utc::now(),
                            error: Some(error.clone()),
                            signaled: Vec::new(),
                        });
                    }
                    result.failed.push(FailedAction {
                        metadata: meta.clone(),
                        error,
                        duration_ms,
                    });
                }
            }
        }

        // Events from actions drained after a stop may have unblocked nodes
        // that were never relaunched; report what each can do now.
        for (idx, state) in states.iter().enumerate() {
            if state.is_pending() {
                let action = &self.actions[idx];
                result.pending.push(PendingAction {
                    metadata: metas[idx].clone(),
                    state: if action.can_run() {
                        NodeState::Runnable
                    } else {
                        NodeState::Blocked
                    },
                    pending_events: action.pending_events(),
                });
            }
        }

        info!(
            completed = result.completed.len(),
            failed = result.failed.len(),
            pending = result.pending.len(),
            "execution finished"
        );

        if let Some(e) = interrupted {
            return Err(e);
        }
        if !result.failed.is_empty() {
            return Err(Error::ActionsFailed(Box::new(result)));
        }
        if !result.pending.is_empty() {
            for pending in &result.pending {
                error!(
                    action = %pending.metadata.name,
                    waiting_for = %EventList(&pending.pending_events),
                    "action blocked with nothing left to run"
                );
            }
            metrics::unsatisfiable_graphs().add(1, &[]);
            return Err(Error::Unsatisfiable(Box::new(result)));
        }
        Ok(result)
    }

    /// Signal `events` to every pending action other than `from`.
    fn broadcast(
        &self,
        from: usize,
        events: &[Event],
        states: &[NodeState],
        metas: &[ActionMetadata],
    ) -> Vec<Signaled> {
        let mut signaled = Vec::new();
        for event in events {
            for (idx, action) in self.actions.iter().enumerate() {
                if idx == from || !states[idx].is_pending() {
                    continue;
                }
                if action.signal(event) {
                    debug!(event = %event, action = %metas[idx].name, "event consumed");
                    signaled.push(Signaled {
                        event: event.clone(),
                        node: idx,
                        action: metas[idx].name.clone(),
                    });
                }
            }
        }
        if !signaled.is_empty() {
            metrics::signals_delivered().add(signaled.len() as u64, &[]);
        }
        signaled
    }
}
