//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Send a fully built outbound request to the upstream
//! - Stream the upstream status, headers and body back unchanged
//! - Classify failures (bad target, unreachable, timeout)
//!
//! # Design Decisions
//! - One pooled client per strategy, shared by all requests
//! - Connect and request deadlines come from configuration
//! - Dropping the returned future aborts the upstream call

use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Response};
use url::Url;

use crate::config::TimeoutConfig;
use crate::observability::metrics;

/// Errors talking to the upstream.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid upstream target: {0}")]
    InvalidTarget(String),

    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    #[error("upstream timed out: {0}")]
    Timeout(String),

    #[error("failed to read request body: {0}")]
    RequestBody(String),

    #[error("failed to build upstream client: {0}")]
    Client(String),
}

/// Request to be sent to the upstream.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Transport used by the reverse proxy.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<Response<Body>, UpstreamError>;
}

/// `reqwest` backed upstream client.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.upstream_connect_secs))
            .timeout(Duration::from_secs(timeouts.upstream_request_secs))
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<Response<Body>, UpstreamError> {
        let start = Instant::now();
        let url = request.url.to_string();

        let result = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await;

        let upstream = match result {
            Ok(upstream) => upstream,
            Err(e) => {
                metrics::record_upstream(None, start);
                tracing::error!(url = %url, error = %e, "Upstream error");
                return Err(classify(e));
            }
        };

        let status = upstream.status();
        metrics::record_upstream(Some(status.as_u16()), start);
        tracing::debug!(url = %url, status = %status, "Upstream responded");

        let headers = upstream.headers().clone();
        let version = upstream.version();
        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.version_mut() = version;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

fn classify(error: reqwest::Error) -> UpstreamError {
    if error.is_timeout() {
        UpstreamError::Timeout(error.to_string())
    } else if error.is_builder() {
        UpstreamError::InvalidTarget(error.to_string())
    } else {
        UpstreamError::Unreachable(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_upstream() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpUpstream::new(&TimeoutConfig::default()).unwrap();
        let request = UpstreamRequest {
            method: Method::GET,
            url: Url::parse(&format!("http://{addr}/")).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };

        let err = client.send(request).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Unreachable(_)), "{err}");
    }
}
