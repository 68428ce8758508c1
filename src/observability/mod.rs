//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Submitter and field store produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stderr (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Every submission state transition is both logged and counted
//! - Intent ID flows through all submission log events
//! - Metrics are recorded through the `metrics` facade; without an installed
//!   exporter they are no-ops

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
