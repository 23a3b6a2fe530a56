//! Execution traces.
//!
//! The executor records one [`TraceEntry`] per finished action: timing,
//! outcome, and which pending actions consumed each produced event.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Mutex, PoisonError};

use crate::action::ActionMetadata;
use crate::event::Event;

/// An event delivered to, and consumed by, another action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signaled {
    pub event: Event,
    /// Position of the consuming action in the executor.
    pub node: usize,
    /// Name of the consuming action.
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    /// Position of the action in the executor. Names need not be unique.
    pub node: usize,
    pub action: ActionMetadata,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub error: Option<String>,
    pub signaled: Vec<Signaled>,
}

/// Receives trace entries as actions finish. Called concurrently.
pub trait Tracer: Send + Sync {
    fn record(&self, entry: TraceEntry);
}

/// Keeps entries in memory in completion order.
#[derive(Debug, Default)]
pub struct MemoryTracer {
    entries: Mutex<Vec<TraceEntry>>,
}

impl MemoryTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<TraceEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Tracer for MemoryTracer {
    fn record(&self, entry: TraceEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

/// Renders the executed graph as a Graphviz digraph.
///
/// One node per action, failed actions in red, and an edge from producer to
/// consumer for every consumed event. Consumers that never ran are drawn
/// dashed.
#[derive(Debug, Default)]
pub struct GraphvizTracer {
    inner: MemoryTracer,
}

impl GraphvizTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self) -> String {
        let entries = self.inner.entries();
        let mut ids: HashMap<usize, String> = HashMap::new();
        let mut next = 0usize;
        let mut out = String::from("digraph rgraph {\n");

        for entry in &entries {
            let id = format!("n{next}");
            next += 1;
            let color = if entry.error.is_some() {
                " color=red"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "  {id} [label=\"{}\\n({})\"{color}];",
                escape(&entry.action.name),
                entry.action.action_type
            );
            ids.insert(entry.node, id);
        }

        for entry in &entries {
            for signaled in &entry.signaled {
                if !ids.contains_key(&signaled.node) {
                    let id = format!("n{next}");
                    next += 1;
                    let _ = writeln!(
                        out,
                        "  {id} [label=\"{}\" style=dashed];",
                        escape(&signaled.action)
                    );
                    ids.insert(signaled.node, id);
                }
                let _ = writeln!(
                    out,
                    "  {} -> {} [label=\"{}\"];",
                    ids[&entry.node],
                    ids[&signaled.node],
                    escape(&signaled.event.to_string())
                );
            }
        }

        out.push_str("}\n");
        out
    }
}

impl Tracer for GraphvizTracer {
    fn record(&self, entry: TraceEntry) {
        self.inner.record(entry);
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
