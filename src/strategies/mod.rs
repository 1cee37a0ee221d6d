//! Request handling strategies.
//!
//! # Data Flow
//! ```text
//! Catch-all route
//!     → factory.rs (strategy chosen from settings at startup)
//!     → Strategy::apply(request, span)
//!     → Response, or StrategyError mapped by the HTTP layer
//! ```

pub mod create;
pub mod factory;
pub mod filefixtures;
pub mod proxyrules;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::config::schema::InvalidRedirectVia;
use crate::observability::SpanAttributes;
use crate::proxy::UpstreamError;
use crate::routing::RuleLoadError;

pub use factory::strategy_provider;
pub use filefixtures::FileFixturesStrategy;
pub use proxyrules::{decide, Decision, Match, ProxyRulesStrategy};

/// Errors surfaced by a strategy to the serving layer.
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error(transparent)]
    RuleLoad(#[from] RuleLoadError),

    #[error(transparent)]
    InvalidRedirectVia(#[from] InvalidRedirectVia),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("rewritten location {0:?} is not a valid header value")]
    InvalidLocation(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("failed to read request body: {0}")]
    RequestBody(String),

    #[error("templates directory {} does not exist", .0.display())]
    TemplatesDirNotFound(std::path::PathBuf),

    #[error("failed to render fixture: {0}")]
    Template(String),
}

impl StrategyError {
    /// True for errors caused by settings rather than by the request.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            StrategyError::RuleLoad(RuleLoadError::MissingRulesFilename)
                | StrategyError::InvalidRedirectVia(_)
                | StrategyError::UnknownStrategy(_)
                | StrategyError::TemplatesDirNotFound(_)
        )
    }
}

/// A way of answering requests that reached the catch-all route.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn apply(
        &self,
        request: Request<Body>,
        span: Option<&dyn SpanAttributes>,
    ) -> Result<Response, StrategyError>;
}
