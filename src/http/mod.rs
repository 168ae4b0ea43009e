//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, admission check)
//!     → request.rs (correlation id)
//!     → forward.rs (route lookup, outbound request, upstream call)
//!     → context.rs (identity / correlation id onto outbound headers)
//!     → response.rs (gateway-authored errors) or relayed upstream response
//!     → Send to client
//! ```

pub mod context;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use context::{Identity, RequestContext, TrustContextPropagator, X_REQUEST_ID, X_USER_ID};
pub use forward::{ForwardOutcome, ForwardingEngine};
pub use server::{AppState, GatewayServer};
