//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request pipeline produces:
//!     → events.rs (one ForwardEvent per request → GatewayObserver)
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through all log lines of a request
//! - Observer is a trait so embedders and tests can capture events

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{ForwardEvent, GatewayObserver, TracingObserver};
