//! Rows and enums for the application lifecycle tables.
//!
//! Status and request-type values are stored as Postgres enums and serialized
//! with the same wire names the frontend consumes (`cvReview`, `waitResult`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgHasArrayType, PgTypeInfo};
use sqlx::FromRow;
use uuid::Uuid;

/// Where an application sits in the screening funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_application_status", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum ApplicationStatus {
    CvReview,
    Interview,
    WaitResult,
    Rejected,
    Approved,
}

// The status-guarded UPDATE in the store binds a slice of these. The derive
// covers the scalar type only; the array side must name the `_`-prefixed
// type Postgres creates alongside the enum.
impl PgHasArrayType for ApplicationStatus {
    fn array_type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("_job_application_status")
    }
}

/// The request kind recorded alongside every status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_req_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReqType {
    Next,
    Reject,
    Wait,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobApplicationRow {
    pub id: Uuid,
    pub vacancy_id: Uuid,
    pub applicant_id: Uuid,
    pub resume_version_id: Uuid,
    pub status: ApplicationStatus,
    pub contacts: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One criterion's verdict from one screening run. Rows from the same run
/// share `created_at`; a criterion named `error` marks a failed run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvEvaluationRow {
    pub id: Uuid,
    pub job_application_id: Uuid,
    pub resume_version_id: Uuid,
    pub model: String,
    pub criterion: String,
    pub score: i32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationEventRow {
    pub id: Uuid,
    pub job_application_id: Uuid,
    pub req_type: ReqType,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}
