//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route, status
//! - `gateway_request_duration_seconds` (histogram): gateway-side latency
//! - `gateway_upstream_duration_seconds` (histogram): upstream round trip
//! - `gateway_rate_limited_total` (counter): admission rejections
//! - `gateway_tracked_clients` (gauge): buckets in the admission registry
//! - `gateway_reaped_clients_total` (counter): buckets evicted as idle
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Label used when no route matched.
pub const NO_ROUTE: &str = "none";

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(route: &str, status: u16, total: Duration, upstream: Option<Duration>) {
    let route = route.to_string();
    counter!("gateway_requests_total", "route" => route.clone(), "status" => status.to_string())
        .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route.clone())
        .record(total.as_secs_f64());
    if let Some(upstream) = upstream {
        histogram!("gateway_upstream_duration_seconds", "route" => route)
            .record(upstream.as_secs_f64());
    }
}

pub fn record_rate_limited() {
    counter!("gateway_rate_limited_total").increment(1);
}

pub fn record_tracked_clients(count: usize) {
    gauge!("gateway_tracked_clients").set(count as f64);
}

pub fn record_reaped_clients(count: usize) {
    counter!("gateway_reaped_clients_total").increment(count as u64);
}
