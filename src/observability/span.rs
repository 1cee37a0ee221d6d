//! Per-request span and rule annotations.
//!
//! # Responsibilities
//! - Create the request span with the rule attributes pre-declared
//! - Record which rule handled a request and where it was sent
//!
//! # Design Decisions
//! - The span travels explicitly with the request (`Option<&dyn SpanAttributes>`)
//! - Recording on a disabled span, or with no span at all, is a no-op
//! - Absent values are recorded as the `none` sentinel

use axum::http::Request;
use tracing::{field, Span};

use crate::routing::Rule;

pub const RULE_NAME: &str = "mockstack.proxyrules.rule_name";
pub const RULE_METHOD: &str = "mockstack.proxyrules.rule_method";
pub const RULE_PATTERN: &str = "mockstack.proxyrules.rule_pattern";
pub const RULE_REPLACEMENT: &str = "mockstack.proxyrules.rule_replacement";
pub const REWRITTEN_URL: &str = "mockstack.proxyrules.rewritten_url";
pub const TEMPLATE_NAME: &str = "mockstack.filefixtures.template_name";

/// Value recorded when there is no rule, or the rule leaves a field unset.
pub const NONE: &str = "none";

/// Something attributes can be attached to.
pub trait SpanAttributes: Send + Sync {
    fn set_attribute(&self, key: &'static str, value: &str);
}

impl SpanAttributes for Span {
    fn set_attribute(&self, key: &'static str, value: &str) {
        self.record(key, value);
    }
}

/// Span for one inbound request, used by the HTTP trace layer.
pub fn request_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        version = ?request.version(),
        mockstack.proxyrules.rule_name = field::Empty,
        mockstack.proxyrules.rule_method = field::Empty,
        mockstack.proxyrules.rule_pattern = field::Empty,
        mockstack.proxyrules.rule_replacement = field::Empty,
        mockstack.proxyrules.rewritten_url = field::Empty,
        mockstack.filefixtures.template_name = field::Empty,
    )
}

/// Record the routing outcome of a request on its span.
pub fn update_observability(
    span: Option<&dyn SpanAttributes>,
    rule: Option<&Rule>,
    target: Option<&str>,
) {
    let Some(span) = span else {
        return;
    };

    span.set_attribute(RULE_NAME, rule.and_then(Rule::name).unwrap_or(NONE));
    span.set_attribute(RULE_METHOD, rule.and_then(Rule::method).unwrap_or(NONE));
    span.set_attribute(RULE_PATTERN, rule.map(Rule::pattern).unwrap_or(NONE));
    span.set_attribute(RULE_REPLACEMENT, rule.map(Rule::replacement).unwrap_or(NONE));
    span.set_attribute(REWRITTEN_URL, target.unwrap_or(NONE));
}
