//! Inbound request identification.
//!
//! # Responsibilities
//! - Give every request a correlation id (UUID v4) unless the client sent one
//! - Echo the id on the client response
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The id travels in request extensions; the forwarder reads it from there

use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub use crate::http::context::X_REQUEST_ID;

/// Layer assigning `x-request-id` to requests that lack one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer copying the request's `x-request-id` onto its response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}
