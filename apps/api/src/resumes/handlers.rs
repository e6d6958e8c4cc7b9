use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ResumeVersionRow;
use crate::resumes::service::{register_resume, RegisterResume};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterResumeRequest {
    pub applicant_id: Uuid,
    pub storage_path: String,
}

/// POST /api/v1/resumes
pub async fn handle_register_resume(
    State(state): State<AppState>,
    Json(req): Json<RegisterResumeRequest>,
) -> Result<(StatusCode, Json<ResumeVersionRow>), AppError> {
    let version = register_resume(
        state.store.as_ref(),
        &RegisterResume {
            applicant_id: req.applicant_id,
            storage_path: req.storage_path,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(version)))
}
