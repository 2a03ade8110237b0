pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Screening API
        .route(
            "/api/v1/jobs/:job_id/process-cvs",
            post(handlers::handle_process_cvs).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/jobs/:job_id/cv-matches",
            get(handlers::handle_list_cv_matches),
        )
        .with_state(state)
}
