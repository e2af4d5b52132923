//! HTTP API for sietch.
//!
//! A thin axum layer over the matchmaking services. Authentication happens
//! upstream; the gateway forwards the caller's identity in `X-User-Id`.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
