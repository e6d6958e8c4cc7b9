pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::applications::handlers as applications;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Applications
        .route("/api/v1/applications", post(applications::handle_apply))
        .route(
            "/api/v1/applications/:id",
            get(applications::handle_get_application),
        )
        .route(
            "/api/v1/applications/:id/review",
            post(applications::handle_review),
        )
        .route(
            "/api/v1/applicants/:id/applications",
            get(applications::handle_applicant_applications),
        )
        .route(
            "/api/v1/vacancies/:id/applications",
            get(applications::handle_vacancy_applications),
        )
        // Resumes
        .route("/api/v1/resumes", post(resumes::handle_register_resume))
        .with_state(state)
}
