//! Welcome service.
//!
//! A minimal HTTP service for containerized deployment, built with Tokio and
//! Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌─────────────────────────────────────────────────┐
//!                     │                 WELCOME SERVICE                 │
//!                     │                                                 │
//!   Client Request    │  ┌──────────┐   ┌────────────┐   ┌───────────┐  │
//!   ──────────────────┼─▶│  axum    │──▶│ middleware │──▶│dispatcher │  │
//!                     │  │  serve   │   │  stack     │   │           │  │
//!                     │  └──────────┘   └────────────┘   └─────┬─────┘  │
//!                     │                                        │        │
//!                     │                                        ▼        │
//!   Client Response   │  ┌──────────┐   ┌────────────┐   ┌───────────┐  │
//!   ◀─────────────────┼──│ security │◀──│  envelope  │◀──│route table│  │
//!                     │  │ headers  │   │  builder   │   │ handlers  │  │
//!                     │  └──────────┘   └────────────┘   └───────────┘  │
//!                     │                                                 │
//!                     │  ┌───────────────────────────────────────────┐  │
//!                     │  │ config │ observability │ lifecycle/drain  │  │
//!                     │  └───────────────────────────────────────────┘  │
//!                     └─────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use welcome_service::config::{loader, ServiceConfig};
use welcome_service::http::{HttpServer, ServerError};
use welcome_service::lifecycle::{signals, startup, Lifecycle, ShutdownOutcome};
use welcome_service::observability::logging;

#[derive(Parser)]
#[command(name = "welcome-service", version)]
#[command(about = "Minimal HTTP welcome service", long_about = None)]
struct Cli {
    /// TOML configuration file. Environment variables override its values.
    #[arg(short, long, env = "CONFIG_FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match loader::load_from_env(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("welcome-service: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("welcome-service: failed to initialize logging: {}", e);
    }
    startup::install_fatal_handlers();

    match run(config).await {
        Ok(ShutdownOutcome::Drained) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Ok(ShutdownOutcome::TimedOut) => {
            tracing::error!("Forced shutdown after grace period");
            ExitCode::from(1)
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServiceConfig) -> Result<ShutdownOutcome, ServerError> {
    tracing::info!(
        version = %config.app.version,
        environment = %config.app.environment,
        "welcome-service starting"
    );
    tracing::info!(
        bind_address = %config.server.bind_address(),
        metrics_enabled = config.observability.metrics_enabled,
        request_timeout_secs = config.server.request_timeout_secs,
        shutdown_grace_secs = config.server.shutdown_grace_secs,
        "Configuration loaded"
    );

    let listener = startup::bind(&config.server).await?;
    let grace = Duration::from_secs(config.server.shutdown_grace_secs);
    let server = HttpServer::new(config)?;

    Lifecycle::new(grace)
        .run(server, listener, signals::termination())
        .await
}
