//! Containerized welcome service library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod system;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::{Lifecycle, Shutdown, ShutdownOutcome};
