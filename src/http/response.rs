//! Gateway-authored responses.
//!
//! # Responsibilities
//! - Map gateway errors to client status codes and fixed bodies
//! - Keep transport detail out of anything the client sees
//!
//! # Design Decisions
//! - Upstream responses never pass through here; they are relayed as-is
//! - Upstream timeouts and transport failures both become 502

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::GatewayError;

pub const ROUTE_NOT_FOUND_BODY: &str = "Route not found";
pub const BAD_GATEWAY_BODY: &str = "Bad gateway: upstream service unavailable";
pub const RATE_LIMITED_BODY: &str = "Too Many Requests";

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::UpstreamUnreachable { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn client_message(&self) -> &'static str {
        match self {
            GatewayError::RouteNotFound { .. } => ROUTE_NOT_FOUND_BODY,
            GatewayError::UpstreamUnreachable { .. } => BAD_GATEWAY_BODY,
            GatewayError::RateLimited { .. } => RATE_LIMITED_BODY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), self.client_message()).into_response()
    }
}
