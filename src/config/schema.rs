//! Configuration schema definitions.
//!
//! All types derive Serde traits so a TOML file can supply any subset of the
//! fields; everything else falls back to the `Default` impls below.

use serde::{Deserialize, Serialize};

/// Largest response body buffered from a handler (the proxy payload limit).
pub const DEFAULT_MAX_BODY_BYTES: usize = 6 * 1024 * 1024;

/// Root configuration for the engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Host runtime settings.
    pub runtime: RuntimeConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Retry policy for polling the runtime API.
    pub retry: RetryConfig,
}

/// Host runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Runtime API address (`host:port`). Its presence means we run inside
    /// the serverless host.
    pub api: Option<String>,

    /// Function name, used as a log field only.
    pub function_name: Option<String>,

    /// Upper bound on a buffered handler response body.
    pub max_body_bytes: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api: None,
            function_name: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,

    /// Emit ANSI colour codes.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "gateway_engine=info".to_string(),
            // CloudWatch renders escape codes literally.
            ansi: false,
        }
    }
}

/// Backoff policy for runtime API polling.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Consecutive failed polls tolerated before the loop gives up.
    pub max_attempts: u32,

    /// First backoff delay in milliseconds.
    pub base_delay_ms: u64,

    /// Backoff ceiling in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 50,
            max_delay_ms: 2000,
        }
    }
}
