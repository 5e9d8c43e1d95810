//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use welcome_service::config::ServiceConfig;
use welcome_service::http::{HttpServer, ServerError};
use welcome_service::lifecycle::Shutdown;
use welcome_service::observability::metrics::{DisabledMetrics, PrometheusMetrics, RequestMetrics};

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub task: JoinHandle<Result<(), ServerError>>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.task.await;
    }
}

/// Start a server with the given config and metrics registry.
pub async fn start_server(config: ServiceConfig, metrics: Arc<dyn RequestMetrics>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::with_metrics(config, metrics).unwrap();
    let shutdown = Shutdown::new();
    let task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer { addr, shutdown, task }
}

#[allow(dead_code)]
pub async fn start_default() -> TestServer {
    start_server(ServiceConfig::default(), Arc::new(DisabledMetrics)).await
}

#[allow(dead_code)]
pub async fn start_with_metrics() -> TestServer {
    start_server(
        ServiceConfig::default(),
        Arc::new(PrometheusMetrics::new().unwrap()),
    )
    .await
}

/// Client without connection pooling or system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
