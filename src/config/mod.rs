//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → MOCKSTACK_* environment overrides
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → handed to the strategy factory and the HTTP server
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    FileFixturesConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ProxyRulesConfig, RedirectVia, Settings, TimeoutConfig,
};
pub use validation::ValidationError;
