//! Postgres-backed `ScreeningStore`.
//!
//! Evaluations and events are append-only; the only row ever UPDATEd is the
//! application's status (and the `is_current` flag on resume versions).
//! `record_outcome` leans on `now()` being transaction-stable so every row
//! of a batch shares one timestamp.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{NewApplication, NewResumeVersion, ScreeningStore, StoreError};
use crate::models::{
    ApplicantRow, ApplicationEventRow, ApplicationStatus, CvEvaluationRow, JobApplicationRow,
    ResumeVersionRow, VacancyRow,
};
use crate::pipeline::lifecycle::EvaluationOutcome;

const APPLICANT_VACANCY_UNIQUE: &str = "ux_job_applications_applicant_vacancy";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScreeningStore for PgStore {
    async fn vacancy(&self, id: Uuid) -> Result<Option<VacancyRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, VacancyRow>("SELECT * FROM vacancies WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn applicant(&self, id: Uuid) -> Result<Option<ApplicantRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, ApplicantRow>("SELECT * FROM applicants WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn resume_version(&self, id: Uuid) -> Result<Option<ResumeVersionRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, ResumeVersionRow>("SELECT * FROM resume_versions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn current_resume_version(
        &self,
        applicant_id: Uuid,
    ) -> Result<Option<ResumeVersionRow>, StoreError> {
        Ok(sqlx::query_as::<_, ResumeVersionRow>(
            "SELECT * FROM resume_versions WHERE applicant_id = $1 AND is_current",
        )
        .bind(applicant_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn register_resume_version(
        &self,
        new: NewResumeVersion,
    ) -> Result<ResumeVersionRow, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE resume_versions SET is_current = false WHERE applicant_id = $1 AND is_current",
        )
        .bind(new.applicant_id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, ResumeVersionRow>(
            r#"
            INSERT INTO resume_versions
                (id, applicant_id, storage_path, content_hash, is_current, created_at)
            VALUES ($1, $2, $3, $4, true, now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.applicant_id)
        .bind(&new.storage_path)
        .bind(&new.content_hash)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn create_application(
        &self,
        new: NewApplication,
    ) -> Result<JobApplicationRow, StoreError> {
        sqlx::query_as::<_, JobApplicationRow>(
            r#"
            INSERT INTO job_applications
                (id, vacancy_id, applicant_id, resume_version_id, status, contacts,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, now(), now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.vacancy_id)
        .bind(new.applicant_id)
        .bind(new.resume_version_id)
        .bind(ApplicationStatus::CvReview)
        .bind(&new.contacts)
        .fetch_one(&self.pool)
        .await
        .map_err(map_application_insert_error)
    }

    async fn application(&self, id: Uuid) -> Result<Option<JobApplicationRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, JobApplicationRow>("SELECT * FROM job_applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn applications_for_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<JobApplicationRow>, StoreError> {
        Ok(sqlx::query_as::<_, JobApplicationRow>(
            "SELECT * FROM job_applications WHERE applicant_id = $1 ORDER BY created_at DESC",
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn applications_for_vacancy(
        &self,
        vacancy_id: Uuid,
    ) -> Result<Vec<JobApplicationRow>, StoreError> {
        Ok(sqlx::query_as::<_, JobApplicationRow>(
            "SELECT * FROM job_applications WHERE vacancy_id = $1 ORDER BY created_at DESC",
        )
        .bind(vacancy_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn evaluations(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<CvEvaluationRow>, StoreError> {
        Ok(sqlx::query_as::<_, CvEvaluationRow>(
            r#"
            SELECT * FROM cv_evaluations
            WHERE job_application_id = $1
            ORDER BY created_at DESC, criterion ASC
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn events(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<ApplicationEventRow>, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationEventRow>(
            r#"
            SELECT * FROM application_events
            WHERE job_application_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn record_outcome(
        &self,
        application_id: Uuid,
        expected: &[ApplicationStatus],
        outcome: &EvaluationOutcome,
    ) -> Result<JobApplicationRow, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Guarded update: matching zero rows means the application vanished
        // or someone transitioned it first, and the whole outcome is dropped.
        let updated = sqlx::query_as::<_, JobApplicationRow>(
            r#"
            UPDATE job_applications
            SET status = $2, updated_at = now()
            WHERE id = $1 AND status = ANY($3)
            RETURNING *
            "#,
        )
        .bind(application_id)
        .bind(outcome.transition.to)
        .bind(expected.to_vec())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(application) = updated else {
            return Err(StoreError::StatusConflict);
        };

        for evaluation in &outcome.evaluations {
            sqlx::query(
                r#"
                INSERT INTO cv_evaluations
                    (id, job_application_id, resume_version_id, model, criterion,
                     score, strengths, weaknesses, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(application_id)
            .bind(evaluation.resume_version_id)
            .bind(&evaluation.model)
            .bind(&evaluation.criterion)
            .bind(evaluation.score)
            .bind(&evaluation.strengths)
            .bind(&evaluation.weaknesses)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO application_events
                (id, job_application_id, req_type, status, created_at)
            VALUES ($1, $2, $3, $4, now())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(application_id)
        .bind(outcome.transition.req)
        .bind(outcome.transition.to)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(application)
    }
}

fn map_application_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.constraint() == Some(APPLICANT_VACANCY_UNIQUE) {
            return StoreError::DuplicateApplication;
        }
    }
    StoreError::Database(err)
}
