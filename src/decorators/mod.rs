//! Cross-cutting decorators.
//!
//! # Design Decisions
//! - Each decorator takes a config struct whose `None` fields fall back to a
//!   built-in default
//! - Decorators observe and forward; only `PanicRecover` changes an outcome,
//!   and only for a handler that unwound

pub mod log_event;
pub mod panic_recover;

pub use log_event::{default_log_fn, LogEvent, LogEventConfig, LogEventFn};
pub use panic_recover::{PanicLogFn, PanicRecover, PanicRecoverConfig};
