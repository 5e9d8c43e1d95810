//! Immutable application identity captured at startup.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::AppConfig;
use crate::http::response::format_timestamp;

/// Version, environment and start time of this process.
///
/// Created once from configuration and shared read-only with every handler.
#[derive(Debug, Clone)]
pub struct AppInfo {
    name: &'static str,
    version: String,
    environment: String,
    start_timestamp: DateTime<Utc>,
    started: Instant,
}

/// Serialized form of [`AppInfo`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfoView {
    pub name: &'static str,
    pub version: String,
    pub environment: String,
    pub start_timestamp: String,
}

impl AppInfo {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: config.version.clone(),
            environment: config.environment.clone(),
            start_timestamp: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn start_timestamp(&self) -> DateTime<Utc> {
        self.start_timestamp
    }

    /// Time since startup, from the monotonic clock.
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn view(&self) -> AppInfoView {
        AppInfoView {
            name: self.name,
            version: self.version.clone(),
            environment: self.environment.clone(),
            start_timestamp: format_timestamp(self.start_timestamp),
        }
    }
}
