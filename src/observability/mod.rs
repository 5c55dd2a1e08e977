//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! engine, decorators, runtime loop
//!     → logging.rs (tracing subscriber, stdout for the host's log collector)
//!     → metrics.rs (invocation counters and latency through the metrics facade)
//! ```
//!
//! # Design Decisions
//! - Request id is a field on every invocation log line
//! - No metrics exporter is installed; an embedding binary may add a recorder

pub mod logging;
pub mod metrics;
