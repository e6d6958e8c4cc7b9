//! Persistence seam for the API and the screening pipeline.
//!
//! `ScreeningStore` is everything handlers and background tasks need from
//! storage. `PgStore` speaks Postgres; `MemoryStore` mirrors its semantics
//! for tests and database-free local runs.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    ApplicantRow, ApplicationEventRow, ApplicationStatus, CvEvaluationRow, JobApplicationRow,
    ResumeVersionRow, VacancyRow,
};
use crate::pipeline::lifecycle::EvaluationOutcome;

pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an application for this applicant and vacancy already exists")]
    DuplicateApplication,

    #[error("application is missing or its status changed concurrently")]
    StatusConflict,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub vacancy_id: Uuid,
    pub applicant_id: Uuid,
    pub resume_version_id: Uuid,
    pub contacts: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewResumeVersion {
    pub applicant_id: Uuid,
    pub storage_path: String,
    pub content_hash: String,
}

#[async_trait]
pub trait ScreeningStore: Send + Sync {
    async fn vacancy(&self, id: Uuid) -> Result<Option<VacancyRow>, StoreError>;
    async fn applicant(&self, id: Uuid) -> Result<Option<ApplicantRow>, StoreError>;

    async fn resume_version(&self, id: Uuid) -> Result<Option<ResumeVersionRow>, StoreError>;
    async fn current_resume_version(
        &self,
        applicant_id: Uuid,
    ) -> Result<Option<ResumeVersionRow>, StoreError>;
    /// Inserts a new version and flips `is_current` off the previous one,
    /// atomically.
    async fn register_resume_version(
        &self,
        new: NewResumeVersion,
    ) -> Result<ResumeVersionRow, StoreError>;

    /// `DuplicateApplication` when the applicant already applied to this
    /// vacancy.
    async fn create_application(
        &self,
        new: NewApplication,
    ) -> Result<JobApplicationRow, StoreError>;
    async fn application(&self, id: Uuid) -> Result<Option<JobApplicationRow>, StoreError>;
    async fn applications_for_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<JobApplicationRow>, StoreError>;
    async fn applications_for_vacancy(
        &self,
        vacancy_id: Uuid,
    ) -> Result<Vec<JobApplicationRow>, StoreError>;

    /// Newest batch first.
    async fn evaluations(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<CvEvaluationRow>, StoreError>;
    /// Chronological.
    async fn events(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<ApplicationEventRow>, StoreError>;

    /// Applies one outcome atomically: the status update (guarded by
    /// `expected`), the evaluation inserts and the event insert land
    /// together or not at all. `StatusConflict` when the application is
    /// missing or no longer in an expected status; nothing is written then.
    async fn record_outcome(
        &self,
        application_id: Uuid,
        expected: &[ApplicationStatus],
        outcome: &EvaluationOutcome,
    ) -> Result<JobApplicationRow, StoreError>;
}
