//! Strategy errors as HTTP responses.
//!
//! - Configuration problems → 500 Internal Server Error
//! - Unreadable request body → 400 Bad Request
//! - Upstream unreachable or bad target → 502 Bad Gateway
//! - Upstream timeout → 504 Gateway Timeout

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::proxy::UpstreamError;
use crate::strategies::StrategyError;

impl StrategyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StrategyError::Upstream(UpstreamError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            StrategyError::Upstream(UpstreamError::RequestBody(_)) | StrategyError::RequestBody(_) => {
                StatusCode::BAD_REQUEST
            }
            StrategyError::Upstream(UpstreamError::Client(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            StrategyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            StrategyError::RuleLoad(_)
            | StrategyError::InvalidRedirectVia(_)
            | StrategyError::UnknownStrategy(_)
            | StrategyError::InvalidLocation(_)
            | StrategyError::TemplatesDirNotFound(_)
            | StrategyError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StrategyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, self.to_string()).into_response()
    }
}
