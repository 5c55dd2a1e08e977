//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::EngineConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Address of the host runtime API; set only inside the serverless host.
pub const RUNTIME_API_ENV: &str = "AWS_LAMBDA_RUNTIME_API";
/// Name of the running function.
pub const FUNCTION_NAME_ENV: &str = "AWS_LAMBDA_FUNCTION_NAME";
/// Optional TOML file with engine settings.
pub const CONFIG_PATH_ENV: &str = "GATEWAY_ENGINE_CONFIG";
/// Log filter override.
pub const LOG_FILTER_ENV: &str = "GATEWAY_ENGINE_LOG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: EngineConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build configuration from the process environment.
///
/// Starts from the file named by `GATEWAY_ENGINE_CONFIG` (or defaults) and
/// overlays the runtime-provided variables.
pub fn from_env() -> Result<EngineConfig, ConfigError> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Same as [`from_env`] with an injectable variable source.
pub fn from_lookup<F>(lookup: F) -> Result<EngineConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match lookup(CONFIG_PATH_ENV) {
        Some(path) if !path.is_empty() => load_config(Path::new(&path))?,
        _ => EngineConfig::default(),
    };

    if let Some(api) = lookup(RUNTIME_API_ENV).filter(|v| !v.is_empty()) {
        config.runtime.api = Some(api);
    }
    if let Some(name) = lookup(FUNCTION_NAME_ENV).filter(|v| !v.is_empty()) {
        config.runtime.function_name = Some(name);
    }
    if let Some(filter) = lookup(LOG_FILTER_ENV).filter(|v| !v.is_empty()) {
        config.logging.filter = filter;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_runtime() {
        let config = from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.runtime.api, None);
        assert_eq!(config.logging.filter, "gateway_engine=info");
    }

    #[test]
    fn test_env_overlays() {
        let config = from_lookup(lookup(&[
            (RUNTIME_API_ENV, "127.0.0.1:9001"),
            (FUNCTION_NAME_ENV, "orders"),
            (LOG_FILTER_ENV, "debug"),
        ]))
        .unwrap();

        assert_eq!(config.runtime.api.as_deref(), Some("127.0.0.1:9001"));
        assert_eq!(config.runtime.function_name.as_deref(), Some("orders"));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[runtime]\napi = \"10.0.0.1:80\"\nmax_body_bytes = 1024\n\n[retry]\nmax_attempts = 2"
        )
        .unwrap();

        let path = file.path().to_string_lossy().to_string();
        let config = from_lookup(lookup(&[
            (CONFIG_PATH_ENV, path.as_str()),
            (RUNTIME_API_ENV, "127.0.0.1:9001"),
        ]))
        .unwrap();

        assert_eq!(config.runtime.api.as_deref(), Some("127.0.0.1:9001"));
        assert_eq!(config.runtime.max_body_bytes, 1024);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.base_delay_ms, 50);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retry]\nmax_attempts = 0").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
