//! Per-invocation context.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Invocation metadata delivered by the host runtime.
///
/// A fresh `Context` is built for every invocation and handed by value to the
/// handler chain. The translated HTTP request carries a copy as an extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// Runtime request id (`Lambda-Runtime-Aws-Request-Id`).
    pub request_id: String,

    /// Deadline in milliseconds since the Unix epoch; 0 when unknown.
    pub deadline_ms: u64,

    /// ARN of the function being invoked.
    pub invoked_function_arn: String,

    /// Distributed tracing id (`Lambda-Runtime-Trace-Id`).
    pub trace_id: Option<String>,
}

impl Context {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Self::default()
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.deadline_ms = deadline_ms;
        self
    }

    /// Absolute deadline, if the runtime supplied one.
    pub fn deadline(&self) -> Option<SystemTime> {
        (self.deadline_ms > 0).then(|| UNIX_EPOCH + Duration::from_millis(self.deadline_ms))
    }

    /// Time left before the deadline. Zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline().map(|deadline| {
            deadline
                .duration_since(SystemTime::now())
                .unwrap_or(Duration::ZERO)
        })
    }
}
