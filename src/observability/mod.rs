//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gate, asset lookup and handlers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the trace span and the response
//! - Metrics are cheap (atomic increments) and off by default

pub mod logging;
pub mod metrics;
