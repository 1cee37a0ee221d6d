//! Configuration validation.
//!
//! Serde handles the syntax; this module checks values that only make sense
//! together. All errors are collected, not just the first.

use std::net::SocketAddr;

use crate::config::schema::{RedirectVia, Settings};
use crate::strategies::factory::KNOWN_STRATEGIES;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown strategy {0:?}")]
    UnknownStrategy(String),

    #[error("invalid bind address {0:?}")]
    InvalidBindAddress(String),

    #[error("invalid metrics address {0:?}")]
    InvalidMetricsAddress(String),

    #[error("timeout {0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeout {name} ({value}s) must be less than request_secs ({request_secs}s)")]
    UpstreamTimeoutTooLong {
        name: &'static str,
        value: u64,
        request_secs: u64,
    },

    #[error("proxyrules.redirect_via: {0}")]
    InvalidRedirectVia(String),

    #[error("proxyrules.rules_filename is not set")]
    MissingRulesFilename,

    #[error("filefixtures.templates_dir {0:?} is not a directory")]
    TemplatesDirNotFound(String),
}

/// Validate a parsed configuration.
pub fn validate_config(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !KNOWN_STRATEGIES.contains(&settings.strategy.as_str()) {
        errors.push(ValidationError::UnknownStrategy(settings.strategy.clone()));
    }

    if settings.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            settings.listener.bind_address.clone(),
        ));
    }

    if settings.observability.metrics_enabled
        && settings.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            settings.observability.metrics_address.clone(),
        ));
    }

    let timeouts = [
        ("request_secs", settings.timeouts.request_secs),
        ("upstream_connect_secs", settings.timeouts.upstream_connect_secs),
        ("upstream_request_secs", settings.timeouts.upstream_request_secs),
    ];
    for (name, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    let request_secs = settings.timeouts.request_secs;
    for &(name, value) in &timeouts[1..] {
        if request_secs > 0 && value >= request_secs {
            errors.push(ValidationError::UpstreamTimeoutTooLong {
                name,
                value,
                request_secs,
            });
        }
    }

    if let Err(e) = settings.proxyrules.redirect_via.parse::<RedirectVia>() {
        errors.push(ValidationError::InvalidRedirectVia(e.to_string()));
    }

    if settings.strategy == "proxyrules" && settings.proxyrules.rules_filename.is_none() {
        errors.push(ValidationError::MissingRulesFilename);
    }

    let templates_dir = &settings.filefixtures.templates_dir;
    if settings.strategy == "filefixtures" && !templates_dir.is_dir() {
        errors.push(ValidationError::TemplatesDirNotFound(
            templates_dir.display().to_string(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Settings {
        let mut settings = Settings::default();
        settings.proxyrules.rules_filename = Some("rules.yml".into());
        settings
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut settings = valid();
        settings.strategy = "chaosmonkey".into();
        settings.listener.bind_address = "not-an-address".into();
        settings.timeouts.upstream_request_secs = 0;
        settings.proxyrules.redirect_via = "sometimes".into();

        let errors = validate_config(&settings).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::UnknownStrategy("chaosmonkey".into())));
        assert!(errors.contains(&ValidationError::ZeroTimeout("upstream_request_secs")));
    }

    #[test]
    fn test_missing_rules_filename() {
        let settings = Settings::default();
        let errors = validate_config(&settings).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingRulesFilename]);
    }

    #[test]
    fn test_upstream_timeouts_below_request_timeout() {
        let mut settings = valid();
        settings.timeouts.request_secs = 30;
        settings.timeouts.upstream_request_secs = 30;
        settings.timeouts.upstream_connect_secs = 45;

        let errors = validate_config(&settings).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::UpstreamTimeoutTooLong {
                    name: "upstream_connect_secs",
                    value: 45,
                    request_secs: 30,
                },
                ValidationError::UpstreamTimeoutTooLong {
                    name: "upstream_request_secs",
                    value: 30,
                    request_secs: 30,
                },
            ]
        );

        settings.timeouts.upstream_request_secs = 29;
        settings.timeouts.upstream_connect_secs = 5;
        assert!(validate_config(&settings).is_ok());
    }

    #[test]
    fn test_filefixtures_templates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.strategy = "filefixtures".into();
        settings.filefixtures.templates_dir = dir.path().to_path_buf();
        assert!(validate_config(&settings).is_ok());

        settings.filefixtures.templates_dir = dir.path().join("missing");
        let errors = validate_config(&settings).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::TemplatesDirNotFound(_)]
        ));
    }
}
