//! HTTP API gateway library.
//!
//! Longest-prefix routing to upstream services, transparent forwarding,
//! and per-client token-bucket admission control.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use error::{GatewayError, UpstreamError};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
