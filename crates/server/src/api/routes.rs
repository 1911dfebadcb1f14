use axum::{http::StatusCode, middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, transcripts};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/transcripts", get(transcripts::list))
        .with_state(Arc::clone(&state));

    let documents = ServeDir::new(state.transcripts_dir());

    Router::new()
        .route("/", get(transcripts::index))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .nest("/api/v1", api_routes)
        .nest_service("/transcripts", documents)
        .fallback(|| async { (StatusCode::NOT_FOUND, "Not found") })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
