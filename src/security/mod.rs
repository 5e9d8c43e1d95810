//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Every response, after dispatch:
//!     → headers.rs (hardening headers, CORS, optional CSP)
//!     → Sent to client
//! ```
//!
//! # Design Decisions
//! - Headers are unconditional: they do not depend on request content
//! - Configuration errors surface at startup, never per request

pub mod headers;

pub use headers::SecurityHeaders;
