//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     rules file (YAML/TOML/JSON)
//!     → loader.rs (decode descriptors, compile patterns)
//!     → Freeze as immutable RuleSet
//!
//! Incoming Request (method, path)
//!     → resolver.rs (first matching rule)
//!     → rewrite.rs (expand replacement)
//!     → Return: (rule, target) or no match
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Load is all-or-nothing: one bad rule fails the whole file
//! - Deterministic: same input always matches same rule
//! - First match wins (file order)

pub mod loader;
pub mod resolver;
pub mod rewrite;
pub mod rule;

pub use loader::{load_rules, load_rules_from_path, RuleLoadError};
pub use resolver::RuleSet;
pub use rewrite::rewrite;
pub use rule::{Rule, RuleConfig, RuleError};
