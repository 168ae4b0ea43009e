//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-client token bucket, 429 on rejection)
//!     → Pass to routing
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-For)
//!
//! Outgoing response:
//!     → headers.rs (strip hop-by-hop, add hardening headers)
//! ```
//!
//! # Design Decisions
//! - Admission is checked before routing; rejected clients never reach an upstream
//! - Fail closed: a rejected request never spends a token
//! - No trust in client input

pub mod headers;
pub mod rate_limit;

pub use rate_limit::{AdmissionController, ClientBucket};
