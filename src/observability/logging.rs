//! Structured logging and span export.
//!
//! `RUST_LOG` takes precedence; otherwise the configured level applies to
//! mockstack and tower-http. Output is human readable or JSON lines. When an
//! OTLP endpoint is configured, spans (with their rule attributes) are also
//! exported to it over HTTP.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::{runtime, Resource};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Errors raised while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error(transparent)]
    Init(#[from] TryInitError),

    #[error("failed to build OTLP exporter for {endpoint}: {message}")]
    Otlp { endpoint: String, message: String },
}

/// Keeps the span exporter alive; flush it with [`Telemetry::shutdown`].
#[must_use]
pub struct Telemetry {
    provider: Option<TracerProvider>,
}

impl Telemetry {
    /// Flush pending spans and stop the exporter.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "Failed to flush span exporter");
            }
        }
    }
}

/// Install the global subscriber.
///
/// With an OTLP endpoint this must be called from within a Tokio runtime.
pub fn init_logging(config: &ObservabilityConfig) -> Result<Telemetry, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let provider = config
        .otlp_endpoint
        .as_deref()
        .map(tracer_provider)
        .transpose()?;
    let otel = provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer("mockstack")));

    let registry = tracing_subscriber::registry().with(filter).with(otel);
    match config.log_format {
        LogFormat::Pretty => registry.with(fmt::layer()).try_init()?,
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
    }

    if let Some(endpoint) = &config.otlp_endpoint {
        tracing::info!(endpoint = %endpoint, "Exporting spans over OTLP");
    }
    Ok(Telemetry { provider })
}

fn tracer_provider(endpoint: &str) -> Result<TracerProvider, LoggingError> {
    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| LoggingError::Otlp {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new([
            KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]))
        .build())
}

fn default_directives(level: &str) -> String {
    format!("mockstack={level},tower_http={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives("debug"), "mockstack=debug,tower_http=debug");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tracer_provider_builds_without_collector() {
        let provider = tracer_provider("http://127.0.0.1:4318/v1/traces").unwrap();
        let _tracer = provider.tracer("test");
        Telemetry {
            provider: Some(provider),
        }
        .shutdown();
    }
}
