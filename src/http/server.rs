//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a catch-all route
//! - Wire up middleware (request ID, tracing span, timeout)
//! - Bind server to listener and shut down gracefully
//! - Hand every request to the configured strategy

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::Span;

use crate::config::Settings;
use crate::observability::span::request_span;
use crate::strategies::Strategy;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub strategy: Arc<dyn Strategy>,
}

/// HTTP front end delegating to a strategy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given settings and strategy.
    pub fn new(settings: Settings, strategy: Arc<dyn Strategy>) -> Self {
        let state = AppState { strategy };
        let router = Self::build_router(&settings, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(settings: &Settings, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| request_span(request)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(settings.timeouts.request_secs)));

        Router::new()
            .route("/", any(strategy_handler))
            .route("/{*path}", any(strategy_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// The router, for serving it elsewhere or calling it directly.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler.
async fn strategy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let span = Span::current();
    match state.strategy.apply(request, Some(&span)).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

/// Resolves on Ctrl+C (and SIGTERM on Unix).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
