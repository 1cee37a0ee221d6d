//! Target computation for a matched rule.
//!
//! The result is a plain string: a path in redirect mode, an absolute
//! upstream URL in reverse proxy mode. URL validation is left to the proxy.

use axum::http::Request;

use crate::routing::rule::Rule;

/// Rewrite the request path with `rule`.
pub fn rewrite<B>(rule: &Rule, request: &Request<B>) -> String {
    rule.apply(request)
}
