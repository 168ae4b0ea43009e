//! Trust context propagation.
//!
//! Authentication and correlation-id collaborators run before the
//! forwarding step and attach their results to the request extensions:
//! an [`Identity`] (optional; some routes are unauthenticated) and a
//! [`RequestId`] (set by `SetRequestIdLayer`). The propagator copies both
//! onto the outbound request without validating them.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::header::{HeaderMap, HeaderName, HeaderValue};
use axum::http::Extensions;
use tower_http::request_id::RequestId;

pub const X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Authenticated caller, attached by an upstream authentication layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Read-only view of the per-request trust context.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext<'a> {
    pub identity: Option<&'a Identity>,
    pub request_id: Option<&'a HeaderValue>,
}

impl<'a> RequestContext<'a> {
    pub fn from_extensions(extensions: &'a Extensions) -> Self {
        Self {
            identity: extensions.get::<Identity>(),
            request_id: extensions.get::<RequestId>().map(RequestId::header_value),
        }
    }

    pub fn request_id_str(&self) -> Option<&'a str> {
        self.request_id.and_then(|v| v.to_str().ok())
    }
}

/// Peer address of the inbound connection, when the server recorded it.
pub fn client_addr(extensions: &Extensions) -> Option<SocketAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

/// Admission identity of the caller: its IP address without the port.
pub fn client_identity(extensions: &Extensions) -> String {
    client_addr(extensions)
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Copies identity and correlation id onto outbound headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustContextPropagator;

impl TrustContextPropagator {
    pub fn propagate(&self, context: &RequestContext<'_>, headers: &mut HeaderMap) {
        // Only a context-attached identity may reach the upstream.
        headers.remove(X_USER_ID);

        if let Some(identity) = context.identity {
            match HeaderValue::from_str(identity.as_str()) {
                Ok(value) => {
                    headers.insert(X_USER_ID, value);
                }
                Err(_) => {
                    tracing::warn!("Identity is not a valid header value, not propagated");
                }
            }
        }

        if let Some(request_id) = context.request_id {
            headers.insert(X_REQUEST_ID, request_id.clone());
        }
    }
}
