//! mockstack server
//!
//! Serves every path through the configured strategy.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                    MOCKSTACK                      │
//!   Client Request      │  ┌─────────┐    ┌───────────┐    ┌────────────┐  │
//!   ────────────────────┼─▶│  http   │───▶│ strategy  │───▶│  routing   │  │
//!                       │  │ server  │    │proxyrules │    │ first match│  │
//!                       │  └─────────┘    └─────┬─────┘    └────────────┘  │
//!                       │                       │                          │
//!                       │          ┌────────────┼──────────────┐           │
//!                       │          ▼            ▼              ▼           │
//!   Client Response     │    redirect     reverse proxy   201 / 404        │
//!   ◀───────────────────┼─── (Location)   (upstream) ─────────────────────┼──▶ Upstream
//!                       │                                                  │
//!                       │  config · observability (span, logs, metrics)    │
//!                       │  strategy = filefixtures → rendered .j2 fixture  │
//!                       └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use mockstack::config::{self, Settings};
use mockstack::http::{shutdown_signal, HttpServer};
use mockstack::observability::{logging, metrics};
use mockstack::strategies::strategy_provider;

#[derive(Parser)]
#[command(name = "mockstack")]
#[command(about = "API mock server with rule based redirects and reverse proxying", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "MOCKSTACK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => {
            let mut settings = Settings::default();
            config::loader::apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
            config::validation::validate_config(&settings).map_err(config::ConfigError::Validation)?;
            settings
        }
    };
    if let Some(bind) = cli.bind {
        settings.listener.bind_address = bind;
    }

    let telemetry = logging::init_logging(&settings.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "mockstack starting");

    tracing::info!(
        strategy = %settings.strategy,
        bind_address = %settings.listener.bind_address,
        rules_filename = ?settings.proxyrules.rules_filename,
        redirect_via = %settings.proxyrules.redirect_via,
        reverse_proxy_enabled = settings.proxyrules.reverse_proxy_enabled,
        simulate_create_on_missing = settings.proxyrules.simulate_create_on_missing,
        templates_dir = %settings.filefixtures.templates_dir.display(),
        "Configuration loaded"
    );

    if settings.observability.metrics_enabled {
        metrics::init_metrics(settings.observability.metrics_address.parse()?)?;
    }

    let strategy = strategy_provider(&settings)?;

    let listener = TcpListener::bind(&settings.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(settings, strategy);
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    telemetry.shutdown();
    Ok(())
}
