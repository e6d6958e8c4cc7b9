//! One screening pass over one application.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use super::lifecycle::EvaluationOutcome;
use crate::extract::{self, ExtractError};
use crate::models::{ApplicationStatus, JobApplicationRow};
use crate::screening::{aggregate, CriteriaEvaluator, Decision, EvaluateError, EvaluationResult};
use crate::store::{ScreeningStore, StoreError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("resume text extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("criteria evaluation failed: {0}")]
    Evaluate(#[from] EvaluateError),

    #[error("{0} row is missing for this application")]
    Missing(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a finished run applied, for logging.
#[derive(Debug, Clone)]
pub struct ScreeningSummary {
    pub average_score: f64,
    pub decision: Decision,
    pub status: ApplicationStatus,
}

/// Extract -> evaluate -> aggregate -> record, in that order. Nothing is
/// persisted before `record_outcome`, so a failure anywhere leaves the
/// application untouched for the coordinator to mark.
pub async fn run_screening(
    store: &dyn ScreeningStore,
    evaluator: &dyn CriteriaEvaluator,
    model: &str,
    criteria: &[String],
    application: &JobApplicationRow,
) -> Result<ScreeningSummary, PipelineError> {
    let vacancy = store
        .vacancy(application.vacancy_id)
        .await?
        .ok_or(PipelineError::Missing("vacancy"))?;
    let resume = store
        .resume_version(application.resume_version_id)
        .await?
        .ok_or(PipelineError::Missing("resume version"))?;

    let resume_text = extract::extract_text_async(PathBuf::from(&resume.storage_path)).await?;
    info!(
        "Extracted {} chars of resume text from {}",
        resume_text.chars().count(),
        resume.storage_path
    );

    let result = evaluator
        .evaluate(&vacancy.description, &resume_text, criteria)
        .await?;
    if let EvaluationResult::ParseFailure { raw_model_output } = &result {
        warn!(
            "Model output for application {} held no readable JSON ({} chars)",
            application.id,
            raw_model_output.chars().count()
        );
    }

    let agg = aggregate(&result);
    let outcome =
        EvaluationOutcome::from_result(application.resume_version_id, model, result, &agg);
    let updated = store
        .record_outcome(application.id, &[ApplicationStatus::CvReview], &outcome)
        .await?;

    Ok(ScreeningSummary {
        average_score: agg.average_score,
        decision: agg.decision,
        status: updated.status,
    })
}
