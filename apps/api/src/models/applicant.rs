use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicantRow {
    pub id: Uuid,
    pub full_name: String,
    pub contacts: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One uploaded resume file. Versions are append-only; at most one row per
/// applicant carries `is_current = true`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeVersionRow {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub storage_path: String,
    pub content_hash: String,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
}
