//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (exact (method, path) lookup)
//!     → handlers.rs (endpoint implementation)
//!
//! Route Table (at startup):
//!     RouteTable::standard()
//!     → Reject duplicate (method, path) pairs
//!     → Freeze as immutable table
//! ```
//!
//! # Design Decisions
//! - Routes fixed at startup, immutable at runtime
//! - Exact match only; `/ping/` is not `/ping`
//! - The welcome page's endpoint list is generated from the table

pub mod handlers;
pub mod router;

pub use router::{Endpoint, Route, RouteTable, METRICS_PATH};
