//! Invocation metrics.
//!
//! # Metrics
//! - `engine_invocations_total` (counter): invocations by `outcome`
//!   (`success`, `error`)
//! - `engine_invocation_duration_seconds` (histogram): handler latency
//! - `engine_runtime_poll_failures_total` (counter): failed polls of the
//!   runtime API
//!
//! Without an installed recorder these calls are no-ops.

use std::time::Instant;

/// Outcome label of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Error,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Error => "error",
        }
    }
}

/// Record one completed invocation that started at `start`.
pub fn record_invocation(outcome: Outcome, start: Instant) {
    metrics::counter!("engine_invocations_total", "outcome" => outcome.as_str()).increment(1);
    metrics::histogram!("engine_invocation_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a failed poll of the runtime API.
pub fn record_poll_failure() {
    metrics::counter!("engine_runtime_poll_failures_total").increment(1);
}
