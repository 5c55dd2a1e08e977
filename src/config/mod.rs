//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! GATEWAY_ENGINE_CONFIG (optional TOML)
//!     → loader.rs (parse & deserialize)
//!     → runtime env vars overlaid (AWS_LAMBDA_RUNTIME_API, ...)
//!     → validation.rs (semantic checks)
//!     → EngineConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never mutated afterwards
//! - All fields have defaults so the host environment alone is enough

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{
    EngineConfig, LoggingConfig, RetryConfig, RuntimeConfig, DEFAULT_MAX_BODY_BYTES,
};
