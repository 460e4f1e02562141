//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Engine decisions additionally land in the per-request OperationLog,
//! which mirrors every entry into tracing.
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every access-log span
//! - Metrics are cheap and no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
