//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate upstream URLs (absolute, http, with host)
//! - Validate value ranges (rates > 0, burst >= 1, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{GatewayConfig, RouteConfig};

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("route #{index}: path_prefix must not be empty")]
    EmptyPrefix { index: usize },

    #[error("route #{index} ({prefix}): invalid upstream_url {url:?}: {reason}")]
    InvalidUpstream {
        index: usize,
        prefix: String,
        url: String,
        reason: String,
    },

    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
}

/// Validate a whole configuration, collecting every problem.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if let Err(route_errors) = validate_routes(&config.routes) {
        errors.extend(route_errors);
    }

    let admission = &config.admission;
    if !(admission.sustained_rate.is_finite() && admission.sustained_rate > 0.0) {
        errors.push(ValidationError::NotPositive { field: "admission.sustained_rate" });
    }
    if admission.burst == 0 {
        errors.push(ValidationError::NotPositive { field: "admission.burst" });
    }
    if admission.reap_interval_secs == 0 {
        errors.push(ValidationError::NotPositive { field: "admission.reap_interval_secs" });
    }
    if admission.idle_timeout_secs == 0 {
        errors.push(ValidationError::NotPositive { field: "admission.idle_timeout_secs" });
    }

    let timeouts = &config.timeouts;
    if timeouts.connect_secs == 0 {
        errors.push(ValidationError::NotPositive { field: "timeouts.connect_secs" });
    }
    if timeouts.upstream_secs == 0 {
        errors.push(ValidationError::NotPositive { field: "timeouts.upstream_secs" });
    }
    if timeouts.request_secs == 0 {
        errors.push(ValidationError::NotPositive { field: "timeouts.request_secs" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate route definitions on their own.
///
/// Used both by [`validate_config`] and when a route table is built directly.
pub fn validate_routes(routes: &[RouteConfig]) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = routes
        .iter()
        .enumerate()
        .filter_map(|(index, route)| validate_route(index, route).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(index: usize, route: &RouteConfig) -> Result<(), ValidationError> {
    if route.path_prefix.is_empty() {
        return Err(ValidationError::EmptyPrefix { index });
    }

    let invalid = |reason: String| ValidationError::InvalidUpstream {
        index,
        prefix: route.path_prefix.clone(),
        url: route.upstream_url.clone(),
        reason,
    };

    let url = Url::parse(&route.upstream_url).map_err(|e| invalid(e.to_string()))?;
    // Outbound TLS is not supported; upstreams are plain HTTP services.
    if url.scheme() != "http" {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    // The authority becomes the outbound Host header.
    if !url.username().is_empty() || url.password().is_some() {
        let mut redacted = url.clone();
        let _ = redacted.set_password(None);
        let _ = redacted.set_username("");
        return Err(ValidationError::InvalidUpstream {
            index,
            prefix: route.path_prefix.clone(),
            url: redacted.to_string(),
            reason: "credentials are not allowed in upstream_url".to_string(),
        });
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(invalid("missing host".to_string())),
    }
}
