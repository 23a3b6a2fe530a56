//! Metric instrument factories for rgraph-exec.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"rgraph-exec"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for rgraph-exec instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("rgraph-exec")
}

/// Counter: actions that finished executing.
/// Labels: `type`, `result` ("ok" | "error"), `dry_run`.
pub fn actions_executed() -> Counter<u64> {
    meter()
        .u64_counter("rgraph.action.executed")
        .with_description("Number of actions executed")
        .build()
}

/// Counter: produced events consumed by a pending action.
pub fn signals_delivered() -> Counter<u64> {
    meter()
        .u64_counter("rgraph.signal.delivered")
        .with_description("Number of events consumed by waiting actions")
        .build()
}

/// Counter: executions that ended with blocked actions and nothing runnable.
pub fn unsatisfiable_graphs() -> Counter<u64> {
    meter()
        .u64_counter("rgraph.exec.unsatisfiable")
        .with_description("Executions that stalled on unsatisfiable dependencies")
        .build()
}

/// Histogram: action duration in milliseconds.
/// Labels: `type`.
pub fn action_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("rgraph.action.duration_ms")
        .with_description("Action duration in milliseconds")
        .with_unit("ms")
        .build()
}
