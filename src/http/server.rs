//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the dispatcher as its only handler
//! - Wire up middleware (request ID, tracing, security headers, metrics,
//!   panic boundary, timeout)
//! - Serve on a listener until the shutdown signal fires

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, middleware, response::Response, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ServerConfig, ServiceConfig};
use crate::http::dispatcher::dispatch;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::Envelope;
use crate::observability::metrics::{self, track_requests, RequestMetrics};
use crate::routing::router::{RouteError, RouteTable};
use crate::security::headers::{HeaderError, SecurityHeaders};
use crate::system::AppInfo;

/// Errors from building or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid route table: {0}")]
    Routes(#[from] RouteError),
    #[error("invalid security header: {0}")]
    Headers(#[from] HeaderError),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub info: Arc<AppInfo>,
    pub routes: Arc<RouteTable>,
    pub metrics: Arc<dyn RequestMetrics>,
    pub envelope: Envelope,
    pub server: Arc<ServerConfig>,
    pub max_body_size: usize,
}

impl AppState {
    pub fn new(config: &ServiceConfig, metrics: Arc<dyn RequestMetrics>) -> Result<Self, ServerError> {
        Ok(Self {
            info: Arc::new(AppInfo::new(&config.app)),
            routes: Arc::new(RouteTable::standard()?),
            metrics,
            envelope: Envelope::new(!config.app.is_production()),
            server: Arc::new(config.server.clone()),
            max_body_size: config.security.max_body_size,
        })
    }
}

/// HTTP server for the service.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server, choosing the metrics backend from configuration.
    pub fn new(config: ServiceConfig) -> Result<Self, ServerError> {
        let metrics = metrics::init(&config.observability);
        Self::with_metrics(config, metrics)
    }

    /// Create a server with an explicitly owned metrics registry.
    pub fn with_metrics(
        config: ServiceConfig,
        metrics: Arc<dyn RequestMetrics>,
    ) -> Result<Self, ServerError> {
        let state = AppState::new(&config, metrics)?;
        let headers = SecurityHeaders::from_config(&config.security)?;
        let timeout = Duration::from_secs(config.server.request_timeout_secs);

        let router = Router::new().fallback(dispatch).with_state(state.clone());
        let router = Self::wrap(router, &state, &headers, timeout);

        Ok(Self { router, state })
    }

    /// Apply the middleware stack, innermost first.
    pub(crate) fn wrap(
        router: Router,
        state: &AppState,
        headers: &SecurityHeaders,
        timeout: Duration,
    ) -> Router {
        Self::wrap_with(router, state, headers, timeout, MakeRequestUuid)
    }

    /// Two panic boundaries: the inner one keeps handler panics inside the
    /// metrics and header layers, the outermost catches anything above them.
    fn wrap_with<M>(
        router: Router,
        state: &AppState,
        headers: &SecurityHeaders,
        timeout: Duration,
        make_request_id: M,
    ) -> Router
    where
        M: MakeRequestId + Clone + Send + Sync + 'static,
    {
        let envelope = state.envelope;
        let router = router
            .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
            .layer(middleware::map_response_with_state(envelope, timeout_envelope))
            .layer(CatchPanicLayer::custom(move |err: Box<dyn Any + Send + 'static>| {
                panic_response(envelope, err)
            }))
            .layer(middleware::from_fn_with_state(state.clone(), track_requests));

        let outer_headers = headers.clone();
        headers
            .apply(router)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, make_request_id))
            .layer(CatchPanicLayer::custom(move |err: Box<dyn Any + Send + 'static>| {
                let mut response = panic_response(envelope, err);
                outer_headers.insert_into(response.headers_mut());
                response
            }))
    }

    /// The fully layered router, e.g. for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until `shutdown` fires, then finish in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server no longer accepting connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// The timeout layer answers with an empty 408; give it the envelope.
async fn timeout_envelope(State(envelope): State<Envelope>, response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    envelope.error(
        StatusCode::REQUEST_TIMEOUT,
        "Request Timeout",
        Some("Request did not complete in time".to_string()),
    )
}

fn panic_response(envelope: Envelope, err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %details, "Request panicked");
    envelope.error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        Some(details),
    )
}
