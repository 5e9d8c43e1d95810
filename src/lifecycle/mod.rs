//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Bind listener → Announce readiness
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain (bounded) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then listener, then traffic
//! - Shutdown has timeout: forced exit with non-zero status after deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Lifecycle, LifecycleState, Shutdown, ShutdownOutcome};
