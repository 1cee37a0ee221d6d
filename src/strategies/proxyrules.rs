//! Proxy rules strategy.
//!
//! # Responsibilities
//! - Resolve the first rule matching a request and rewrite its path
//! - Decide between redirect, reverse proxy, simulated create and 404
//! - Annotate the request span on every outcome
//!
//! # Decision Table
//! ```text
//! rule?  reverse_proxy  simulate_create + create-like   → outcome
//! no     -              yes                             → 201 Created
//! no     -              no                              → 404 Not Found
//! yes    no             -                               → 302/301 Location: target
//! yes    yes            -                               → upstream response
//! ```
//!
//! # Design Decisions
//! - `decide` is pure; execution is a separate step per outcome
//! - A bad `redirect_via` fails the request, it is never defaulted
//! - Rules are loaded once at construction; reloading means a new strategy

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{HeaderValue, LOCATION};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::{ProxyRulesConfig, RedirectVia, Settings};
use crate::intent::looks_like_a_create;
use crate::observability::span::NONE;
use crate::observability::{metrics, update_observability, SpanAttributes};
use crate::proxy::{HttpUpstream, ReverseProxy, UpstreamClient};
use crate::routing::{self, rewrite, Rule, RuleSet};
use crate::strategies::create::simulate_create;
use crate::strategies::{Strategy, StrategyError};

/// A rule that matched, with its rewritten target.
#[derive(Debug, Clone)]
pub struct Match<'a> {
    pub rule: &'a Rule,
    pub target: String,
}

/// What to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<'a> {
    Redirect {
        rule: &'a Rule,
        location: String,
        status: StatusCode,
    },
    ReverseProxy {
        rule: &'a Rule,
        target: String,
    },
    SimulateCreate,
    NotFound,
}

impl Decision<'_> {
    /// Metric label for this outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::Redirect { .. } => "redirect",
            Decision::ReverseProxy { .. } => "reverse_proxy",
            Decision::SimulateCreate => "simulate_create",
            Decision::NotFound => "not_found",
        }
    }
}

/// Map a match result and the settings to a decision.
pub fn decide<'a, B>(
    matched: Option<Match<'a>>,
    config: &ProxyRulesConfig,
    request: &Request<B>,
) -> Result<Decision<'a>, StrategyError> {
    match matched {
        None if config.simulate_create_on_missing
            && !request.method().is_safe()
            && looks_like_a_create(request) =>
        {
            Ok(Decision::SimulateCreate)
        }
        None => Ok(Decision::NotFound),
        Some(Match { rule, target }) if config.reverse_proxy_enabled => {
            Ok(Decision::ReverseProxy { rule, target })
        }
        Some(Match { rule, target }) => {
            let via: RedirectVia = config.redirect_via.parse()?;
            Ok(Decision::Redirect {
                rule,
                location: target,
                status: via.status(),
            })
        }
    }
}

/// Rewrites, redirects or forwards requests according to a rules file.
pub struct ProxyRulesStrategy {
    config: ProxyRulesConfig,
    rules: RuleSet,
    proxy: ReverseProxy,
    max_body_size: usize,
}

impl ProxyRulesStrategy {
    /// Load the rules file and build the upstream client.
    pub fn new(settings: &Settings) -> Result<Self, StrategyError> {
        let rules = RuleSet::new(routing::load_rules(&settings.proxyrules)?);
        if rules.is_empty() {
            tracing::warn!("Rules file holds no rules, every request falls through");
        } else {
            tracing::debug!(rules = rules.len(), "Proxy rules strategy ready");
        }
        let upstream = HttpUpstream::new(&settings.timeouts)?;
        Ok(Self::with_rules(settings, rules, Arc::new(upstream)))
    }

    /// Build from already loaded rules and a given upstream transport.
    pub fn with_rules(settings: &Settings, rules: RuleSet, upstream: Arc<dyn UpstreamClient>) -> Self {
        Self {
            config: settings.proxyrules.clone(),
            rules,
            proxy: ReverseProxy::new(upstream, settings.limits.max_body_size),
            max_body_size: settings.limits.max_body_size,
        }
    }

    pub fn rule_for<B>(&self, request: &Request<B>) -> Option<&Rule> {
        self.rules.rule_for(request)
    }

    fn resolve<B>(&self, request: &Request<B>) -> Option<Match<'_>> {
        self.rule_for(request).map(|rule| Match {
            rule,
            target: rewrite(rule, request),
        })
    }

    async fn execute(
        &self,
        decision: Decision<'_>,
        request: Request<Body>,
    ) -> Result<Response, StrategyError> {
        match decision {
            Decision::Redirect {
                location, status, ..
            } => redirect(status, &location),
            Decision::ReverseProxy { target, .. } => {
                Ok(self.proxy.reverse_proxy(request, &target).await?)
            }
            Decision::SimulateCreate => simulate_create(request, self.max_body_size).await,
            Decision::NotFound => Ok((StatusCode::NOT_FOUND, "No matching proxy rule").into_response()),
        }
    }
}

fn redirect(status: StatusCode, location: &str) -> Result<Response, StrategyError> {
    let value = HeaderValue::from_str(location)
        .map_err(|_| StrategyError::InvalidLocation(location.to_string()))?;
    Ok((status, [(LOCATION, value)]).into_response())
}

#[async_trait]
impl Strategy for ProxyRulesStrategy {
    fn name(&self) -> &'static str {
        "proxyrules"
    }

    async fn apply(
        &self,
        request: Request<Body>,
        span: Option<&dyn SpanAttributes>,
    ) -> Result<Response, StrategyError> {
        let matched = self.resolve(&request);
        update_observability(
            span,
            matched.as_ref().map(|m| m.rule),
            matched.as_ref().map(|m| m.target.as_str()),
        );

        let decision = decide(matched, &self.config, &request)?;
        match &decision {
            Decision::Redirect { rule, location, status } => tracing::info!(
                rule = rule.name().unwrap_or(NONE),
                location = %location,
                status = status.as_u16(),
                "Redirecting request"
            ),
            Decision::ReverseProxy { rule, target } => tracing::info!(
                rule = rule.name().unwrap_or(NONE),
                target = %target,
                "Reverse proxying request"
            ),
            Decision::SimulateCreate => tracing::info!(
                method = %request.method(),
                path = %request.uri().path(),
                "No rule matched, simulating create"
            ),
            Decision::NotFound => tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                "No rule matched"
            ),
        }
        metrics::record_decision(decision.outcome());

        self.execute(decision, request).await
    }
}
