//! Static route table.
//!
//! # Responsibilities
//! - Store the (method, exact path) bindings built at startup
//! - Look up the endpoint for a request
//! - Generate the advertised endpoint list from the same bindings
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - Exact string match: no trailing-slash normalization, no prefixes
//! - Ordered `Vec` scan (the table is tiny); order is the documented order

use axum::http::Method;
use serde::Serialize;

/// Path served by the metrics exposition, outside the route table.
pub const METRICS_PATH: &str = "/metrics";

/// Route label used for metrics when a path is not in the table.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Handler selected by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Welcome,
    Ping,
    Health,
    Info,
    Version,
    Echo,
}

/// A static (method, exact-path) binding.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub endpoint: Endpoint,
    pub description: &'static str,
}

impl Route {
    pub fn new(
        method: Method,
        path: &'static str,
        endpoint: Endpoint,
        description: &'static str,
    ) -> Self {
        Self {
            method,
            path,
            endpoint,
            description,
        }
    }
}

/// One entry in the welcome page's endpoint list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointDoc {
    pub method: String,
    pub path: &'static str,
    pub description: &'static str,
}

/// Error building a route table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("duplicate route {method} {path}")]
    Duplicate { method: Method, path: &'static str },
}

/// Immutable table of all routes.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build a table, rejecting duplicate (method, path) pairs.
    pub fn new(routes: Vec<Route>) -> Result<Self, RouteError> {
        for (i, route) in routes.iter().enumerate() {
            if routes[..i]
                .iter()
                .any(|r| r.method == route.method && r.path == route.path)
            {
                return Err(RouteError::Duplicate {
                    method: route.method.clone(),
                    path: route.path,
                });
            }
        }
        Ok(Self { routes })
    }

    /// The service's routes.
    pub fn standard() -> Result<Self, RouteError> {
        Self::new(vec![
            Route::new(Method::GET, "/", Endpoint::Welcome, "Welcome message and service information"),
            Route::new(Method::GET, "/ping", Endpoint::Ping, "Plain-text liveness probe"),
            Route::new(Method::GET, "/healthz", Endpoint::Health, "Health check with uptime and memory"),
            Route::new(Method::GET, "/info", Endpoint::Info, "Application and system information"),
            Route::new(Method::GET, "/version", Endpoint::Version, "Application version"),
            Route::new(Method::POST, "/echo", Endpoint::Echo, "Echo back a JSON request body"),
        ])
    }

    /// Exact-match lookup on method and path.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| r.method == *method && r.path == path)
    }

    /// Bounded-cardinality route label for metrics.
    pub fn route_label(&self, path: &str) -> &'static str {
        if path == METRICS_PATH {
            return METRICS_PATH;
        }
        self.routes
            .iter()
            .find(|r| r.path == path)
            .map(|r| r.path)
            .unwrap_or(UNMATCHED_ROUTE)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Documented endpoints, generated from the table plus the metrics path.
    pub fn endpoints(&self) -> Vec<EndpointDoc> {
        self.routes
            .iter()
            .map(|r| EndpointDoc {
                method: r.method.to_string(),
                path: r.path,
                description: r.description,
            })
            .chain(std::iter::once(EndpointDoc {
                method: Method::GET.to_string(),
                path: METRICS_PATH,
                description: "Prometheus metrics (204 when disabled)",
            }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_valid() {
        let table = RouteTable::standard().unwrap();
        assert_eq!(table.routes().len(), 6);
    }

    #[test]
    fn lookup_is_exact() {
        let table = RouteTable::standard().unwrap();
        assert_eq!(
            table.lookup(&Method::GET, "/ping").map(|r| r.endpoint),
            Some(Endpoint::Ping)
        );
        assert!(table.lookup(&Method::GET, "/ping/").is_none());
        assert!(table.lookup(&Method::GET, "/PING").is_none());
        assert!(table.lookup(&Method::POST, "/ping").is_none());
        assert!(table.lookup(&Method::GET, "/echo").is_none());
        assert_eq!(
            table.lookup(&Method::POST, "/echo").map(|r| r.endpoint),
            Some(Endpoint::Echo)
        );
    }

    #[test]
    fn duplicates_rejected() {
        let err = RouteTable::new(vec![
            Route::new(Method::GET, "/a", Endpoint::Ping, ""),
            Route::new(Method::POST, "/a", Endpoint::Echo, ""),
            Route::new(Method::GET, "/a", Endpoint::Health, ""),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            RouteError::Duplicate {
                method: Method::GET,
                path: "/a"
            }
        );
    }

    #[test]
    fn endpoint_list_tracks_table() {
        let table = RouteTable::standard().unwrap();
        let docs = table.endpoints();
        assert_eq!(docs.len(), table.routes().len() + 1);
        for route in table.routes() {
            assert!(docs
                .iter()
                .any(|d| d.path == route.path && d.method == route.method.as_str()));
        }
        assert_eq!(docs.last().map(|d| d.path), Some(METRICS_PATH));
    }

    #[test]
    fn route_labels_are_bounded() {
        let table = RouteTable::standard().unwrap();
        assert_eq!(table.route_label("/ping"), "/ping");
        assert_eq!(table.route_label("/metrics"), "/metrics");
        assert_eq!(table.route_label("/random/123"), UNMATCHED_ROUTE);
    }
}
