//! Configuration validation.
//!
//! # Design Decisions
//! - Serde handles syntax; this module checks value ranges and formats
//! - Returns all validation errors, not just the first

use std::fmt;

use crate::config::schema::EngineConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check an [`EngineConfig`] for out-of-range or malformed values.
pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(api) = &config.runtime.api {
        if api.contains("://") || api.contains('/') {
            errors.push(ValidationError::new(
                "runtime.api",
                format!("expected host:port, got {api:?}"),
            ));
        }
    }

    if config.runtime.max_body_bytes == 0 {
        errors.push(ValidationError::new("runtime.max_body_bytes", "must be > 0"));
    }

    if config.retry.max_attempts == 0 {
        errors.push(ValidationError::new("retry.max_attempts", "must be > 0"));
    }

    if config.retry.base_delay_ms > config.retry.max_delay_ms {
        errors.push(ValidationError::new(
            "retry.base_delay_ms",
            "must not exceed retry.max_delay_ms",
        ));
    }

    if config.logging.filter.trim().is_empty() {
        errors.push(ValidationError::new("logging.filter", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
