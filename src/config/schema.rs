//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route definitions, in declaration order.
    pub routes: Vec<RouteConfig>,

    /// Per-client admission control.
    pub admission: AdmissionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Response hardening.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// A single routing rule: requests whose path starts with `path_prefix`
/// are forwarded to `upstream_url`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// Path prefix to match (case-sensitive, plain string prefix).
    pub path_prefix: String,

    /// Absolute upstream URL; only scheme and authority are used.
    pub upstream_url: String,
}

impl RouteConfig {
    pub fn new(path_prefix: impl Into<String>, upstream_url: impl Into<String>) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            upstream_url: upstream_url.into(),
        }
    }
}

/// Token-bucket admission control configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Enable admission control.
    pub enabled: bool,

    /// Tokens added per second to every client bucket.
    pub sustained_rate: f64,

    /// Bucket capacity (maximum burst).
    pub burst: u32,

    /// How often the reaper scans for idle clients, in seconds.
    pub reap_interval_secs: u64,

    /// Buckets idle for longer than this are evicted, in seconds.
    pub idle_timeout_secs: u64,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sustained_rate: 2.0,
            burst: 5,
            reap_interval_secs: 60,
            idle_timeout_secs: 180,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Bound on a single upstream call in seconds. Applies to the wait for
    /// response headers and, once relaying, to each gap between body frames.
    pub upstream_secs: u64,

    /// Deadline in seconds from arrival of the inbound request until the
    /// upstream response head; the upstream call gets whatever is left of it.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 10,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Add nosniff / frame / XSS headers to responses that lack them.
    pub secure_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secure_headers: true,
        }
    }
}
