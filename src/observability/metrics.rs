//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Count requests and observe latency per (method, route, status)
//! - Render the Prometheus text format for `GET /metrics`
//! - Emit one access log line per completed request
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, route, status
//! - `http_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - The registry is owned by the server state, never installed globally,
//!   so tests can run isolated instances side by side
//! - Enabled or disabled is decided once at startup; disabled is a no-op sink
//! - Histogram buckets tuned for typical web latencies

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

use crate::config::ObservabilityConfig;
use crate::http::request::RequestIdExt;
use crate::http::server::AppState;

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION: &str = "http_request_duration_seconds";

const DURATION_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// One completed request.
#[derive(Debug, Clone, Copy)]
pub struct MetricSample<'a> {
    pub method: &'a str,
    pub route: &'a str,
    pub status: u16,
    pub duration: Duration,
}

/// Request metrics capability.
pub trait RequestMetrics: Send + Sync {
    /// Whether `/metrics` serves an exposition or answers 204.
    fn is_enabled(&self) -> bool;

    /// Record one completed request.
    fn record(&self, sample: &MetricSample<'_>);

    /// Prometheus exposition text. Empty when disabled.
    fn render(&self) -> String;
}

/// Prometheus-backed registry.
pub struct PrometheusMetrics {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), DURATION_BUCKETS)?
            .build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_counter!(REQUESTS_TOTAL, Unit::Count, "Total HTTP requests");
            describe_histogram!(REQUEST_DURATION, Unit::Seconds, "HTTP request duration");
        });

        Ok(Self { recorder, handle })
    }
}

impl RequestMetrics for PrometheusMetrics {
    fn is_enabled(&self) -> bool {
        true
    }

    fn record(&self, sample: &MetricSample<'_>) {
        let method = sample.method.to_string();
        let route = sample.route.to_string();
        let status = sample.status.to_string();

        metrics::with_local_recorder(&self.recorder, || {
            counter!(
                REQUESTS_TOTAL,
                "method" => method.clone(),
                "route" => route.clone(),
                "status" => status.clone()
            )
            .increment(1);
            histogram!(
                REQUEST_DURATION,
                "method" => method,
                "route" => route,
                "status" => status
            )
            .record(sample.duration.as_secs_f64());
        });
    }

    fn render(&self) -> String {
        self.handle.render()
    }
}

/// No-op sink used when metrics are disabled or failed to initialize.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMetrics;

impl RequestMetrics for DisabledMetrics {
    fn is_enabled(&self) -> bool {
        false
    }

    fn record(&self, _sample: &MetricSample<'_>) {}

    fn render(&self) -> String {
        String::new()
    }
}

/// Choose the metrics implementation once at startup.
///
/// Initialization is best-effort: a failure downgrades to disabled mode.
pub fn init(config: &ObservabilityConfig) -> Arc<dyn RequestMetrics> {
    if !config.metrics_enabled {
        tracing::info!("Metrics disabled by configuration");
        return Arc::new(DisabledMetrics);
    }

    match PrometheusMetrics::new() {
        Ok(metrics) => {
            tracing::info!("Prometheus metrics enabled");
            Arc::new(metrics)
        }
        Err(e) => {
            tracing::info!(error = %e, "Metrics backend unavailable, continuing without metrics");
            Arc::new(DisabledMetrics)
        }
    }
}

/// Middleware that records a sample and logs every completed request.
///
/// `OPTIONS` requests are answered without attribution.
pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = state.routes.route_label(&path);
    let request_id = request.request_id().to_string();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();
    state.metrics.record(&MetricSample {
        method: method.as_str(),
        route,
        status: status.as_u16(),
        duration,
    });

    let duration_ms = duration.as_secs_f64() * 1000.0;
    if status.is_server_error() {
        tracing::error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            "Request failed"
        );
    } else {
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(route: &str, status: u16) -> MetricSample<'_> {
        MetricSample {
            method: "GET",
            route,
            status,
            duration: Duration::from_millis(3),
        }
    }

    fn counter_value(text: &str, route: &str, status: u16) -> Option<f64> {
        text.lines()
            .filter(|l| l.starts_with(REQUESTS_TOTAL))
            .filter(|l| l.contains("method=\"GET\""))
            .filter(|l| l.contains(&format!("route=\"{}\"", route)))
            .find(|l| l.contains(&format!("status=\"{}\"", status)))
            .and_then(|l| l.rsplit(' ').next())
            .and_then(|v| v.parse().ok())
    }

    #[test]
    fn prometheus_counts_per_label_set() {
        let metrics = PrometheusMetrics::new().unwrap();
        for _ in 0..3 {
            metrics.record(&sample("/ping", 200));
        }
        metrics.record(&sample("unmatched", 404));

        let text = metrics.render();
        assert_eq!(counter_value(&text, "/ping", 200), Some(3.0));
        assert_eq!(counter_value(&text, "unmatched", 404), Some(1.0));
        assert!(text.contains(&format!("{}_bucket", REQUEST_DURATION)));
    }

    #[test]
    fn instances_are_isolated() {
        let a = PrometheusMetrics::new().unwrap();
        let b = PrometheusMetrics::new().unwrap();
        a.record(&sample("/ping", 200));

        assert_eq!(counter_value(&a.render(), "/ping", 200), Some(1.0));
        assert_eq!(counter_value(&b.render(), "/ping", 200), None);
    }

    #[test]
    fn disabled_is_noop() {
        let metrics = DisabledMetrics;
        metrics.record(&sample("/ping", 200));
        assert!(!metrics.is_enabled());
        assert!(metrics.render().is_empty());
    }

    #[test]
    fn init_respects_config() {
        let mut config = ObservabilityConfig::default();
        assert!(init(&config).is_enabled());
        config.metrics_enabled = false;
        assert!(!init(&config).is_enabled());
    }
}
