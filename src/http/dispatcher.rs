//! Request classification and dispatch.
//!
//! ```text
//! OPTIONS *            → 204, empty
//! GET /metrics         → exposition (200) or 204 when disabled
//! (method, path) found → handler
//! other method         → 405
//! GET, unknown path    → 404
//! ```
//!
//! Handler errors are converted to a 500 envelope here. Panics are caught
//! one layer further out (see `server.rs`), so nothing inside a request can
//! take the process down.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::request::RequestIdExt;
use crate::http::response::HandlerError;
use crate::http::server::AppState;
use crate::routing::handlers;
use crate::routing::router::{Endpoint, METRICS_PATH};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Fallback handler of the axum router: the single entry point for all requests.
pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    if method == Method::OPTIONS {
        return state.envelope.empty(StatusCode::NO_CONTENT);
    }

    // `Uri::path` already excludes the query; fragments never reach the server.
    let path = request.uri().path().to_string();

    if method == Method::GET && path == METRICS_PATH {
        return metrics_exposition(&state);
    }

    let endpoint = state.routes.lookup(&method, &path).map(|r| r.endpoint);
    let outcome = match endpoint {
        Some(endpoint) => {
            let request_id = request.request_id().to_string();
            tracing::debug!(request_id = %request_id, method = %method, path = %path, "Dispatching");
            invoke(&state, endpoint, request).await
        }
        None if method != Method::GET => {
            return state.envelope.error(
                StatusCode::METHOD_NOT_ALLOWED,
                "Method Not Allowed",
                Some(format!("Method {} not allowed", method)),
            );
        }
        None => {
            return state.envelope.error(
                StatusCode::NOT_FOUND,
                "Not Found",
                Some(format!("Path {} not found", path)),
            );
        }
    };

    outcome.unwrap_or_else(|e| {
        tracing::error!(method = %method, path = %path, error = %e, "Handler failed");
        state.envelope.error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            Some(e.to_string()),
        )
    })
}

async fn invoke(
    state: &AppState,
    endpoint: Endpoint,
    request: Request<Body>,
) -> Result<Response, HandlerError> {
    match endpoint {
        Endpoint::Welcome => handlers::welcome(state),
        Endpoint::Ping => handlers::ping(state),
        Endpoint::Health => handlers::health(state),
        Endpoint::Info => handlers::info(state),
        Endpoint::Version => handlers::version(state),
        Endpoint::Echo => handlers::echo(state, request).await,
    }
}

fn metrics_exposition(state: &AppState) -> Response {
    if !state.metrics.is_enabled() {
        return state.envelope.empty(StatusCode::NO_CONTENT);
    }
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(PROMETHEUS_CONTENT_TYPE))],
        state.metrics.render(),
    )
        .into_response()
}
