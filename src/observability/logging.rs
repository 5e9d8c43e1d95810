//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` wins over the configured level when set

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ServiceConfig};

/// Resolve the effective log format for a configuration.
pub fn log_format(config: &ServiceConfig) -> LogFormat {
    config.observability.log_format.unwrap_or(if config.app.is_production() {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    })
}

/// Default filter directives for a configured level.
pub fn default_directives(level: &str) -> String {
    format!("welcome_service={level},tower_http={level}")
}

/// Install the global subscriber. Safe to call once per process.
pub fn init_logging(config: &ServiceConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(&config.observability.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match log_format(config) {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
}
