pub mod documents;
pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/documents", post(documents::handle_upload))
        .route("/api/v1/documents/:id", get(documents::handle_get_document))
        .route("/api/v1/analyses/:id", get(documents::handle_get_analysis))
        .route(
            "/api/v1/analyses/:id/detailed",
            get(documents::handle_get_detailed),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
