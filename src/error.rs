//! Error taxonomy for the engine.
//!
//! # Design Decisions
//! - Translation failures are deterministic and never retried
//! - Handler failures travel as `BoxError`; only `PanicRecover` produces
//!   `Error::PanicRecovered`
//! - Runtime API failures are kept apart from translation failures so the
//!   runtime loop can decide what to report upstream

use thiserror::Error;

/// Boxed error returned by handlers.
pub type BoxError = tower::BoxError;

/// Errors produced by the adapter, the capture surface and the runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// The event path is malformed (a bad `%` escape).
    #[error("request: parsing path failed: {0}")]
    PathParse(String),

    /// The body was flagged as base64 but is not valid base64.
    #[error("request: decoding base64 body: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// The request object could not be assembled (method, header or uri).
    #[error("request: fail to create request: {0}")]
    RequestConstruction(String),

    /// The handler unwound; carries the panic payload.
    #[error("panic: {0}")]
    PanicRecovered(String),

    /// The handler's response body could not be collected.
    #[error("response: reading handler body: {0}")]
    ResponseBody(#[source] BoxError),

    /// Engine configuration could not be loaded.
    #[error("config: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// `AWS_LAMBDA_RUNTIME_API` is not set.
    #[error("engine: no runtime detected")]
    NoRuntime,

    /// Transport failure talking to the runtime API.
    #[error("runtime: {0}")]
    Runtime(#[from] reqwest::Error),

    /// The runtime API answered with an unexpected status.
    #[error("runtime: {endpoint} returned status {status}")]
    RuntimeStatus { endpoint: String, status: u16 },

    /// A required invocation header was missing from the runtime API.
    #[error("runtime: missing invocation header {0}")]
    MissingInvocationHeader(&'static str),

    /// Event or response (de)serialization failed.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Short type name reported to the runtime API as `errorType`.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::PathParse(_) => "PathParseError",
            Error::Base64Decode(_) => "Base64DecodeError",
            Error::RequestConstruction(_) => "RequestConstructionError",
            Error::PanicRecovered(_) => "PanicRecoveredError",
            Error::ResponseBody(_) => "ResponseBodyError",
            Error::Config(_) => "ConfigError",
            Error::NoRuntime => "NoRuntimeError",
            Error::Runtime(_) | Error::RuntimeStatus { .. } => "RuntimeError",
            Error::MissingInvocationHeader(_) => "MissingInvocationHeaderError",
            Error::Serialization(_) => "SerializationError",
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
