//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every completed request:
//!     → metrics.rs (track_requests: counter + histogram sample)
//!     → logging.rs subscriber (one structured access log line)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON in production)
//!     → GET /metrics (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows into every access log line
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
