//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds before any traffic is announced
//! - Process-wide panics are logged through tracing before the default hook

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::http::response::format_timestamp;
use crate::http::server::ServerError;
use crate::system::AppInfo;

/// Bind the configured address.
///
/// `host` may be an IP literal or a name; names are resolved through the
/// system resolver and the first address that binds wins.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let address = config.bind_address();
    let host = config.host.trim_start_matches('[').trim_end_matches(']');
    let listener = TcpListener::bind((host, config.port))
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

    tracing::info!(address = %listener.local_addr()?, "Listener bound");
    Ok(listener)
}

/// Log that the service is accepting traffic.
pub fn announce_ready(info: &AppInfo, addr: SocketAddr) {
    tracing::info!(
        address = %addr,
        version = %info.version(),
        environment = %info.environment(),
        started_at = %format_timestamp(info.start_timestamp()),
        "Service ready"
    );
}

/// Route panics through tracing so they reach the structured log.
///
/// Panics anywhere in a request's middleware stack become 500 responses. A
/// panic in the server or lifecycle task surfaces as `ServerError::Task` and
/// the process exits with a failure code. A panic on the main task unwinds
/// out of `main` after this hook runs.
pub fn install_fatal_handlers() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        let location = info
            .location()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        tracing::error!(panic = %payload, location = %location, "Panic");
        default_hook(info);
    }));
}
