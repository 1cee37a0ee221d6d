//! mockstack: rule-driven request routing for an API mock server.

pub mod config;
pub mod http;
pub mod intent;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod strategies;

pub use config::Settings;
pub use http::HttpServer;
pub use strategies::{strategy_provider, ProxyRulesStrategy, Strategy, StrategyError};
