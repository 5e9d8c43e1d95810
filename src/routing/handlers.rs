//! Endpoint handlers.
//!
//! Handlers read only [`AppInfo`](crate::system::AppInfo), the effective
//! configuration and process introspection. `echo` is the only one that
//! awaits: it must collect the full body before writing anything.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
};
use serde::Serialize;
use serde_json::Value;

use crate::http::response::{timestamp, HandlerError};
use crate::http::server::AppState;
use crate::routing::router::EndpointDoc;
use crate::system::app_info::AppInfoView;
use crate::system::process::{self, CpuUsage, MemoryUsage};

pub const INVALID_JSON: &str = "Invalid JSON in request body";

#[derive(Serialize)]
struct Welcome {
    message: String,
    app: AppInfoView,
    endpoints: Vec<EndpointDoc>,
}

#[derive(Serialize)]
struct Health<'a> {
    status: &'static str,
    uptime: f64,
    timestamp: String,
    memory: MemoryUsage,
    version: &'a str,
    environment: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SystemInfo {
    platform: &'static str,
    arch: &'static str,
    runtime_version: String,
    uptime: f64,
    memory: MemoryUsage,
    cpu_usage: CpuUsage,
}

#[derive(Serialize)]
struct NetworkInfo<'a> {
    port: u16,
    host: &'a str,
    environment: &'a str,
}

#[derive(Serialize)]
struct Info<'a> {
    app: AppInfoView,
    system: SystemInfo,
    network: NetworkInfo<'a>,
}

#[derive(Serialize)]
struct Version<'a> {
    version: &'a str,
    name: &'static str,
    environment: &'a str,
}

#[derive(Serialize)]
struct Echo {
    received: Value,
    timestamp: String,
    message: &'static str,
}

/// `GET /`
pub fn welcome(state: &AppState) -> Result<Response, HandlerError> {
    let data = Welcome {
        message: format!("Welcome to {}!", state.info.name()),
        app: state.info.view(),
        endpoints: state.routes.endpoints(),
    };
    state.envelope.success(data, StatusCode::OK)
}

/// `GET /ping`
pub fn ping(state: &AppState) -> Result<Response, HandlerError> {
    Ok(state.envelope.plain_text(StatusCode::OK, "pong"))
}

/// `GET /healthz`
///
/// Always healthy while the process is serving; there are no dependency checks.
pub fn health(state: &AppState) -> Result<Response, HandlerError> {
    let data = Health {
        status: "healthy",
        uptime: state.info.uptime().as_secs_f64(),
        timestamp: timestamp(),
        memory: process::memory_usage(),
        version: state.info.version(),
        environment: state.info.environment(),
    };
    state.envelope.success(data, StatusCode::OK)
}

/// `GET /info`
pub fn info(state: &AppState) -> Result<Response, HandlerError> {
    let snapshot = process::ProcessSnapshot::capture();
    let data = Info {
        app: state.info.view(),
        system: SystemInfo {
            platform: process::platform(),
            arch: process::arch(),
            runtime_version: process::runtime_version(),
            uptime: state.info.uptime().as_secs_f64(),
            memory: snapshot.memory,
            cpu_usage: snapshot.cpu,
        },
        network: NetworkInfo {
            port: state.server.port,
            host: &state.server.host,
            environment: state.info.environment(),
        },
    };
    state.envelope.success(data, StatusCode::OK)
}

/// `GET /version`
pub fn version(state: &AppState) -> Result<Response, HandlerError> {
    let data = Version {
        version: state.info.version(),
        name: state.info.name(),
        environment: state.info.environment(),
    };
    state.envelope.success(data, StatusCode::OK)
}

/// `POST /echo`
///
/// A malformed or unreadable body is a client error, never a 500.
pub async fn echo(state: &AppState, request: Request<Body>) -> Result<Response, HandlerError> {
    let body = match to_bytes(request.into_body(), state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) if is_length_limit(&e) => {
            return Ok(state.envelope.error(
                StatusCode::PAYLOAD_TOO_LARGE,
                "Payload Too Large",
                Some(format!("Request body exceeds {} bytes", state.max_body_size)),
            ));
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read echo body");
            return Ok(state.envelope.error(
                StatusCode::BAD_REQUEST,
                INVALID_JSON,
                Some(e.to_string()),
            ));
        }
    };

    match serde_json::from_slice::<Value>(&body) {
        Ok(received) => state.envelope.success(
            Echo {
                received,
                timestamp: timestamp(),
                message: "Echo successful",
            },
            StatusCode::OK,
        ),
        Err(e) => Ok(state
            .envelope
            .error(StatusCode::BAD_REQUEST, INVALID_JSON, Some(e.to_string()))),
    }
}

fn is_length_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = source {
        if err.is::<http_body_util::LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}
