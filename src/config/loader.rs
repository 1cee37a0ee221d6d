//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::Settings;
use crate::config::validation::{validate_config, ValidationError};

/// Prefix shared by all environment overrides.
pub const ENV_PREFIX: &str = "MOCKSTACK_";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {key}")]
    Env { key: String, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the process environment, and validate a TOML file.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut settings: Settings = toml::from_str(&content)?;

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    validate_config(&settings).map_err(ConfigError::Validation)?;

    Ok(settings)
}

/// Apply `MOCKSTACK_*` overrides using the given lookup.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| {
        let key = format!("{ENV_PREFIX}{name}");
        lookup(&key).map(|value| (key, value))
    };

    if let Some((_, value)) = var("STRATEGY") {
        settings.strategy = value;
    }
    if let Some((_, value)) = var("BIND_ADDRESS") {
        settings.listener.bind_address = value;
    }
    if let Some((_, value)) = var("PROXYRULES_RULES_FILENAME") {
        settings.proxyrules.rules_filename = if value.is_empty() {
            None
        } else {
            Some(value.into())
        };
    }
    if let Some((_, value)) = var("PROXYRULES_REDIRECT_VIA") {
        settings.proxyrules.redirect_via = value;
    }
    if let Some((key, value)) = var("PROXYRULES_REVERSE_PROXY_ENABLED") {
        settings.proxyrules.reverse_proxy_enabled = parse_bool(key, value)?;
    }
    if let Some((key, value)) = var("PROXYRULES_SIMULATE_CREATE_ON_MISSING") {
        settings.proxyrules.simulate_create_on_missing = parse_bool(key, value)?;
    }
    if let Some((_, value)) = var("FILEFIXTURES_TEMPLATES_DIR") {
        settings.filefixtures.templates_dir = value.into();
    }
    if let Some((_, value)) = var("OBSERVABILITY_OTLP_ENDPOINT") {
        settings.observability.otlp_endpoint = Some(value).filter(|v| !v.is_empty());
    }

    Ok(())
}

fn parse_bool(key: String, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Env { key, value }),
    }
}
