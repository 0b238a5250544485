pub mod applications;
pub mod files;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Router,
};

use crate::AppState;

/// Room left in the request body for the non-file form fields.
const FORM_FIELDS_ALLOWANCE: usize = 64 * 1024;

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_file_size + FORM_FIELDS_ALLOWANCE;

    let api = Router::new()
        .route(
            "/api/v1/applications",
            get(applications::list_applications).post(applications::submit_application),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::get_application).delete(applications::delete_application),
        )
        .route(
            "/api/v1/applications/:id/status",
            put(applications::update_application_status),
        )
        .route(
            "/api/v1/applications/:id/resume-url",
            get(applications::get_resume_url),
        )
        .route("/api/v1/files/resumes/:filename", get(files::download_resume))
        .route("/api/v1/test-email", get(applications::test_email));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
