//! Rules file loading.
//!
//! # Responsibilities
//! - Resolve the rules file from the proxy rules settings
//! - Decode YAML, TOML or JSON (chosen by extension)
//! - Compile every descriptor into a [`Rule`], all or nothing
//!
//! A rules file is either a bare list of descriptors or a document with a
//! top-level `rules` list:
//!
//! ```yaml
//! rules:
//!   - name: projects
//!     pattern: /api/v1/projects/(\d+)
//!     replacement: /projects/\1
//!     method: GET
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::ProxyRulesConfig;
use crate::routing::rule::{Rule, RuleError};

/// Errors raised while loading a rules file.
#[derive(Debug, thiserror::Error)]
pub enum RuleLoadError {
    #[error("rules_filename is not set")]
    MissingRulesFilename,

    #[error("failed to read rules file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported rules file format {0} (expected .yml, .yaml, .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("rules file {path} must hold a list of rules or a `rules` list: found {found}")]
    InvalidDocument { path: PathBuf, found: &'static str },

    #[error("rule #{index} is invalid: {source}")]
    InvalidRule {
        index: usize,
        #[source]
        source: RuleError,
    },
}

/// Load the rules named by `proxyrules.rules_filename`.
pub fn load_rules(config: &ProxyRulesConfig) -> Result<Vec<Rule>, RuleLoadError> {
    let path = config
        .rules_filename
        .as_deref()
        .ok_or(RuleLoadError::MissingRulesFilename)?;
    load_rules_from_path(path)
}

/// Load and compile the rules in `path`.
pub fn load_rules_from_path(path: &Path) -> Result<Vec<Rule>, RuleLoadError> {
    let content = fs::read_to_string(path).map_err(|source| RuleLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let descriptors = parse_rules(path, &content)?;
    let rules = compile(descriptors)?;

    tracing::info!(path = %path.display(), rules = rules.len(), "Proxy rules loaded");
    Ok(rules)
}

fn parse_rules(path: &Path, content: &str) -> Result<Vec<Value>, RuleLoadError> {
    let parse_error = |message: String| RuleLoadError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let document: Value = match extension.as_deref() {
        Some("yml") | Some("yaml") => {
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?
        }
        Some("toml") => toml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        Some("json") => serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        _ => return Err(RuleLoadError::UnsupportedFormat(path.to_path_buf())),
    };

    let invalid = |found| RuleLoadError::InvalidDocument {
        path: path.to_path_buf(),
        found,
    };
    match document {
        Value::Array(descriptors) => Ok(descriptors),
        Value::Object(mut table) => match table.remove("rules") {
            Some(Value::Array(descriptors)) => Ok(descriptors),
            Some(other) => Err(invalid(kind(&other))),
            None => Err(invalid("a table without `rules`")),
        },
        other => Err(invalid(kind(&other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "nothing",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a table",
    }
}

fn compile(descriptors: Vec<Value>) -> Result<Vec<Rule>, RuleLoadError> {
    descriptors
        .into_iter()
        .enumerate()
        .map(|(index, descriptor)| {
            Rule::from_value(descriptor).map_err(|source| RuleLoadError::InvalidRule { index, source })
        })
        .collect()
}
