//! HTTP surface of the screening service.
//!
//! Routes are nested under `/api/` and guarded by the rate limiter.
//! The router is composable — `screening_api_router()` returns a
//! `Router` that can be mounted on any axum server.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::screening_api_router;
pub use types::ApiContext;
