//! Gateway error taxonomy.
//!
//! Every variant is terminal for the request that raised it; nothing is
//! retried. Statuses returned by an upstream are not errors and never
//! appear here.

use std::time::Duration;

/// Failure talking to an upstream.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("could not build outbound request: {0}")]
    InvalidTarget(#[from] axum::http::Error),
}

/// Request-level gateway errors, each mapped to a client status in
/// [`crate::http::response`].
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("no route for path {path}")]
    RouteNotFound { path: String },

    #[error("upstream {upstream} unreachable: {source}")]
    UpstreamUnreachable {
        upstream: String,
        #[source]
        source: UpstreamError,
    },

    #[error("client {client} exceeded its request rate")]
    RateLimited { client: String },
}
