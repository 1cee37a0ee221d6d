//! Reverse proxy executor.
//!
//! Mirrors the inbound request onto the rewritten upstream URL: same method
//! and body, query string carried over, `Host` rewritten.

use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::Request;
use axum::response::Response;
use url::Url;

use crate::proxy::headers::reverse_proxy_headers;
use crate::proxy::upstream::{UpstreamClient, UpstreamError, UpstreamRequest};

/// Forwards requests through a shared [`UpstreamClient`].
#[derive(Clone)]
pub struct ReverseProxy {
    client: Arc<dyn UpstreamClient>,
    max_body_size: usize,
}

impl ReverseProxy {
    pub fn new(client: Arc<dyn UpstreamClient>, max_body_size: usize) -> Self {
        Self {
            client,
            max_body_size,
        }
    }

    /// Forward `request` to `target` and return the upstream response as is.
    pub async fn reverse_proxy(
        &self,
        request: Request<Body>,
        target: &str,
    ) -> Result<Response, UpstreamError> {
        let (parts, body) = request.into_parts();

        let url = upstream_url(target, parts.uri.query())?;
        let headers = reverse_proxy_headers(&parts.headers, &url)?;
        let body = body::to_bytes(body, self.max_body_size)
            .await
            .map_err(|e| UpstreamError::RequestBody(e.to_string()))?;

        tracing::info!(method = %parts.method, url = %url, "Forwarding request upstream");

        self.client
            .send(UpstreamRequest {
                method: parts.method,
                url,
                headers,
                body,
            })
            .await
    }
}

/// Parse `target` and carry the inbound query string over.
pub fn upstream_url(target: &str, query: Option<&str>) -> Result<Url, UpstreamError> {
    let mut url =
        Url::parse(target).map_err(|e| UpstreamError::InvalidTarget(format!("{target:?}: {e}")))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(UpstreamError::InvalidTarget(format!("{target:?} is not an absolute URL")));
    }

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        let combined = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
            _ => query.to_string(),
        };
        url.set_query(Some(&combined));
    }

    Ok(url)
}
