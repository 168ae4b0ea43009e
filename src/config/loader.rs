//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the process environment, and validate a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Parse and validate a TOML document, applying overrides from `env`.
pub fn parse_config<F>(content: &str, env: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: GatewayConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, env);

    validate_config(&config).map_err(ConfigError::Invalid)?;

    tracing::debug!(routes = config.routes.len(), "Configuration parsed");
    Ok(config)
}

/// Overlay deployment-specific settings from environment variables.
///
/// `GATEWAY_BIND_ADDRESS` replaces the whole bind address; `PORT` then
/// replaces only its port. `GATEWAY_LOG_LEVEL` replaces the log level.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(addr) = env("GATEWAY_BIND_ADDRESS") {
        tracing::info!(variable = "GATEWAY_BIND_ADDRESS", "Using environment override");
        config.listener.bind_address = addr;
    }

    if let Some(port) = env("PORT") {
        tracing::info!(variable = "PORT", "Using environment override");
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    if let Some(level) = env("GATEWAY_LOG_LEVEL") {
        tracing::info!(variable = "GATEWAY_LOG_LEVEL", "Using environment override");
        config.observability.log_level = level;
    }
}
