//! Outbound header derivation.

use axum::http::header::{HeaderMap, HeaderValue, HOST};
use url::Url;

use crate::proxy::upstream::UpstreamError;

/// Copy of `headers` with `Host` pointing at the upstream.
///
/// The port is kept when the target uses a non-default one. Every other
/// header passes through unchanged; the inbound map is never modified.
pub fn reverse_proxy_headers(headers: &HeaderMap, target: &Url) -> Result<HeaderMap, UpstreamError> {
    let host = target
        .host_str()
        .ok_or_else(|| UpstreamError::InvalidTarget(format!("{target} has no host")))?;
    let authority = match target.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    let value = HeaderValue::from_str(&authority)
        .map_err(|e| UpstreamError::InvalidTarget(format!("{authority}: {e}")))?;

    let mut headers = headers.clone();
    headers.insert(HOST, value);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Host", HeaderValue::from_static("example.com"));
        headers.insert("User-Agent", HeaderValue::from_static("test"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers
    }

    #[test]
    fn test_host_is_replaced() {
        let headers = inbound();
        let target = Url::parse("https://api.target.com/path").unwrap();

        let modified = reverse_proxy_headers(&headers, &target).unwrap();

        assert_eq!(modified["host"], "api.target.com");
        assert_eq!(modified["user-agent"], "test");
        assert_eq!(modified["accept"], "application/json");
        assert_eq!(modified.len(), 3);
        // Inbound map untouched.
        assert_eq!(headers["HOST"], "example.com");
    }

    #[test]
    fn test_explicit_port_is_kept() {
        let target = Url::parse("http://127.0.0.1:9000/path").unwrap();
        let modified = reverse_proxy_headers(&inbound(), &target).unwrap();
        assert_eq!(modified["host"], "127.0.0.1:9000");

        let target = Url::parse("https://api.target.com:443/path").unwrap();
        let modified = reverse_proxy_headers(&inbound(), &target).unwrap();
        assert_eq!(modified["host"], "api.target.com");
    }

    #[test]
    fn test_missing_host_header_is_added() {
        let target = Url::parse("http://upstream.local/").unwrap();
        let modified = reverse_proxy_headers(&HeaderMap::new(), &target).unwrap();
        assert_eq!(modified["host"], "upstream.local");
    }

    #[test]
    fn test_target_without_host() {
        let target = Url::parse("mailto:someone@example.com").unwrap();
        let err = reverse_proxy_headers(&inbound(), &target).unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidTarget(_)));
    }
}
