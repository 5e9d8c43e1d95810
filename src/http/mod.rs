//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (axum::serve)
//!     → server.rs (middleware stack: request ID, trace, headers, metrics,
//!                  panic boundary, timeout)
//!     → dispatcher.rs (classify: OPTIONS, /metrics, route table, 405, 404)
//!     → routing handlers
//!     → response.rs (envelope)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
pub use response::{ApiResponse, Envelope, HandlerError};
pub use server::{AppState, HttpServer, ServerError};
