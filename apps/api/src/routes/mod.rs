pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers as pipeline_handlers;
use crate::profile::handlers as profile_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile API: upload résumé text, read the current profile
        .route(
            "/api/v1/cv",
            post(profile_handlers::handle_upload_cv).get(profile_handlers::handle_get_cv),
        )
        // Discovery API: one full pipeline run per call
        .route("/api/v1/discover", post(pipeline_handlers::handle_discover))
        .with_state(state)
}
