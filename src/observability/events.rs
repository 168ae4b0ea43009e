//! Per-request outcome events.
//!
//! The request pipeline never stores timings itself; it hands one
//! [`ForwardEvent`] per request to a [`GatewayObserver`].

use std::time::Duration;

use crate::observability::metrics;

/// Outcome of one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardEvent {
    /// Correlation id, when the request carried one.
    pub request_id: Option<String>,
    /// Prefix of the resolved route; `None` if the request never got that far.
    pub route: Option<String>,
    /// Status sent to the client.
    pub status: u16,
    /// Gateway-side processing time: admission, routing and forwarding.
    pub total: Duration,
    /// Upstream round trip, when an upstream call was made.
    pub upstream: Option<Duration>,
}

/// Receives request outcomes.
pub trait GatewayObserver: Send + Sync + 'static {
    fn record(&self, event: &ForwardEvent);
}

/// Default observer: one structured log line plus metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl GatewayObserver for TracingObserver {
    fn record(&self, event: &ForwardEvent) {
        let route = event.route.as_deref().unwrap_or(metrics::NO_ROUTE);
        tracing::info!(
            request_id = event.request_id.as_deref().unwrap_or("-"),
            route = %route,
            status = event.status,
            total_ms = event.total.as_secs_f64() * 1000.0,
            upstream_ms = event.upstream.map(|d| d.as_secs_f64() * 1000.0),
            "Request completed"
        );
        metrics::record_request(route, event.status, event.total, event.upstream);
    }
}
