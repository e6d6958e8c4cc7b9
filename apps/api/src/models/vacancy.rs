use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a vacancy. Only `active` vacancies accept applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vacancy_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VacancyStatus {
    Active,
    Closed,
    Stopped,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VacancyRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: VacancyStatus,
    pub created_at: DateTime<Utc>,
}
