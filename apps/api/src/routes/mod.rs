pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::scheduling;
use crate::screening;
use crate::state::AppState;

/// Whole-body cap for the upload route. Axum's 2 MiB default would reject
/// multipart requests whose individual files are legal (up to 10 MiB each);
/// per-file size validation still happens in the pipeline.
const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/upload-resumes/",
            post(screening::handlers::handle_upload_resumes)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/schedule-interview/:session_id",
            post(scheduling::handlers::handle_schedule_interview),
        )
        .with_state(state)
}
