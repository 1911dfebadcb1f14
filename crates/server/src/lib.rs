//! HTTP surface of the middleman service: stored transcripts, health,
//! sanitized config and Prometheus metrics.

pub mod api;
pub mod metrics;
pub mod state;

pub use api::create_router;
pub use state::AppState;
