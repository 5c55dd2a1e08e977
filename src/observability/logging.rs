//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber once per process
//! - Take the filter from `RUST_LOG`, falling back to the configured directive
//!
//! # Design Decisions
//! - Plain text, one event per line; the host collector timestamps lines
//! - Re-initialization is a no-op, so tests and binaries can both call it

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber. Returns false if one was already set.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(config.ansi).with_target(false))
        .try_init()
        .is_ok()
}
