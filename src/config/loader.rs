//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `listener.port`.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {name} value `{value}`")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid bot pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid header value: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply the `PORT`
/// override and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<GateConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GateConfig::default(),
    };

    let config = apply_port_override(config, std::env::var(PORT_ENV).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Replace the listener port with `raw` when present and non-empty.
pub fn apply_port_override(
    mut config: GateConfig,
    raw: Option<String>,
) -> Result<GateConfig, ConfigError> {
    if let Some(raw) = raw.filter(|v| !v.trim().is_empty()) {
        config.listener.port = raw.trim().parse().map_err(|_| ConfigError::Env {
            name: PORT_ENV,
            value: raw.clone(),
        })?;
    }
    Ok(config)
}
