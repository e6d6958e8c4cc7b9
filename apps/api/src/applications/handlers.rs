use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::applications::service::{
    application_detail, applications_for_applicant, applications_for_vacancy, review_application,
    submit_application, ApplicantApplication, ApplicationDetail, SubmitApplication,
    VacancyApplication,
};
use crate::errors::AppError;
use crate::models::JobApplicationRow;
use crate::pipeline::{EvaluationJob, ReviewDecision};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ApplyRequest {
    pub vacancy_id: Uuid,
    pub applicant_id: Uuid,
    pub contact: Option<String>,
}

/// POST /api/v1/applications
pub async fn handle_apply(
    State(state): State<AppState>,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<JobApplicationRow>), AppError> {
    let application = submit_application(
        state.store.as_ref(),
        &SubmitApplication {
            vacancy_id: req.vacancy_id,
            applicant_id: req.applicant_id,
            contact: req.contact,
        },
    )
    .await?;

    // Queued only after the row is committed; the response never waits for
    // the model.
    let _screening = state.coordinator.submit(EvaluationJob {
        application_id: application.id,
    });

    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationDetail>, AppError> {
    let detail = application_detail(state.store.as_ref(), id).await?;
    Ok(Json(detail))
}

/// GET /api/v1/applicants/:id/applications
pub async fn handle_applicant_applications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ApplicantApplication>>, AppError> {
    let list = applications_for_applicant(state.store.as_ref(), id).await?;
    Ok(Json(list))
}

/// GET /api/v1/vacancies/:id/applications
pub async fn handle_vacancy_applications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<VacancyApplication>>, AppError> {
    let list = applications_for_vacancy(state.store.as_ref(), id).await?;
    Ok(Json(list))
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
}

/// POST /api/v1/applications/:id/review
pub async fn handle_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<JobApplicationRow>, AppError> {
    let updated = review_application(state.store.as_ref(), id, req.decision).await?;
    Ok(Json(updated))
}
