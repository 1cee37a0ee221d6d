//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request:
//!     → span.rs (request span, rule attributes)
//!     → logging.rs (structured log events)
//!     → metrics.rs (decision counters, upstream latency)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//!     → Any tracing layer reading span fields
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the span (x-request-id)
//! - Metrics are cheap (no-op without a recorder)
//! - Annotating without a span never fails

pub mod logging;
pub mod metrics;
pub mod span;

pub use span::{request_span, update_observability, SpanAttributes};
