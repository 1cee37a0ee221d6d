//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for mockstack.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Root configuration for mockstack.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Name of the strategy serving the catch-all route.
    pub strategy: String,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Proxy rules strategy settings.
    pub proxyrules: ProxyRulesConfig,

    /// File fixtures strategy settings.
    pub filefixtures: FileFixturesConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strategy: "proxyrules".to_string(),
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
            proxyrules: ProxyRulesConfig::default(),
            filefixtures: FileFixturesConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Timeout configuration for inbound and upstream calls.
///
/// Upstream timeouts must stay below `request_secs` so a slow upstream
/// surfaces as a gateway timeout rather than an inbound request timeout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed to serve an inbound request, in seconds.
    pub request_secs: u64,

    /// Upstream connection establishment timeout in seconds.
    pub upstream_connect_secs: u64,

    /// Upstream request timeout (until the response completes) in seconds.
    pub upstream_request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            upstream_connect_secs: 5,
            upstream_request_secs: 30,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// OTLP/HTTP collector endpoint (e.g. "http://localhost:4318/v1/traces").
    /// Spans are exported only when set.
    pub otlp_endpoint: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
            otlp_endpoint: None,
        }
    }
}

/// Settings consumed by the proxy rules strategy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyRulesConfig {
    /// Rules file (YAML, TOML or JSON). Required by the strategy.
    pub rules_filename: Option<PathBuf>,

    /// Redirect flavour used for matched rules, see [`RedirectVia`].
    ///
    /// Kept as the raw configured string; it is parsed when a redirect is
    /// issued so that a bad value fails the request instead of defaulting.
    pub redirect_via: String,

    /// Forward matched requests upstream instead of redirecting.
    pub reverse_proxy_enabled: bool,

    /// Answer unmatched create-like requests with 201 instead of 404.
    pub simulate_create_on_missing: bool,
}

impl Default for ProxyRulesConfig {
    fn default() -> Self {
        Self {
            rules_filename: None,
            redirect_via: RedirectVia::TemporaryRedirect.to_string(),
            reverse_proxy_enabled: false,
            simulate_create_on_missing: false,
        }
    }
}

/// Settings consumed by the file fixtures strategy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FileFixturesConfig {
    /// Directory holding the `.j2` fixture templates.
    pub templates_dir: PathBuf,
}

impl Default for FileFixturesConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("./templates"),
        }
    }
}

/// HTTP redirect used for matched rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectVia {
    TemporaryRedirect,
    PermanentRedirect,
}

impl RedirectVia {
    pub fn status(self) -> StatusCode {
        match self {
            RedirectVia::TemporaryRedirect => StatusCode::FOUND,
            RedirectVia::PermanentRedirect => StatusCode::MOVED_PERMANENTLY,
        }
    }
}

impl fmt::Display for RedirectVia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectVia::TemporaryRedirect => f.write_str("temporary_redirect"),
            RedirectVia::PermanentRedirect => f.write_str("permanent_redirect"),
        }
    }
}

/// Error returned for an unrecognized `redirect_via` value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid redirect via value: {0:?}")]
pub struct InvalidRedirectVia(pub String);

impl FromStr for RedirectVia {
    type Err = InvalidRedirectVia;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temporary_redirect" => Ok(RedirectVia::TemporaryRedirect),
            "permanent_redirect" => Ok(RedirectVia::PermanentRedirect),
            other => Err(InvalidRedirectVia(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.strategy, "proxyrules");
        assert_eq!(settings.proxyrules.redirect_via, "temporary_redirect");
        assert!(settings.proxyrules.rules_filename.is_none());
        assert!(!settings.proxyrules.reverse_proxy_enabled);
        assert!(!settings.proxyrules.simulate_create_on_missing);
        assert!(settings.timeouts.upstream_request_secs < settings.timeouts.request_secs);
        assert!(settings.timeouts.upstream_connect_secs < settings.timeouts.request_secs);
        assert_eq!(settings.filefixtures.templates_dir, PathBuf::from("./templates"));
        assert!(settings.observability.otlp_endpoint.is_none());
    }

    #[test]
    fn test_minimal_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [proxyrules]
            rules_filename = "rules.yml"
            redirect_via = "permanent_redirect"
            "#,
        )
        .unwrap();
        assert_eq!(settings.proxyrules.rules_filename, Some(PathBuf::from("rules.yml")));
        assert_eq!(settings.listener.bind_address, "0.0.0.0:8000");
        assert_eq!(settings.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_redirect_via() {
        assert_eq!("temporary_redirect".parse::<RedirectVia>().unwrap().status(), StatusCode::FOUND);
        assert_eq!(
            "permanent_redirect".parse::<RedirectVia>().unwrap().status(),
            StatusCode::MOVED_PERMANENTLY
        );
        let err = "invalid".parse::<RedirectVia>().unwrap_err();
        assert!(err.to_string().contains("Invalid redirect via value"));
    }
}
