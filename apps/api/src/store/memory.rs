#![allow(dead_code)]

//! In-memory `ScreeningStore` for tests and database-free local runs.
//!
//! Mirrors the Postgres semantics that matter to callers: the duplicate
//! check, the `is_current` flip, the status guard in `record_outcome`, and
//! one shared timestamp per outcome batch.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{NewApplication, NewResumeVersion, ScreeningStore, StoreError};
use crate::models::{
    ApplicantRow, ApplicationEventRow, ApplicationStatus, CvEvaluationRow, JobApplicationRow,
    ResumeVersionRow, VacancyRow, VacancyStatus,
};
use crate::pipeline::lifecycle::EvaluationOutcome;

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    vacancies: HashMap<Uuid, VacancyRow>,
    applicants: HashMap<Uuid, ApplicantRow>,
    resume_versions: Vec<ResumeVersionRow>,
    applications: HashMap<Uuid, JobApplicationRow>,
    evaluations: Vec<CvEvaluationRow>,
    events: Vec<ApplicationEventRow>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vacancy creation has no API surface; seed directly.
    pub fn insert_vacancy(
        &self,
        name: &str,
        description: &str,
        status: VacancyStatus,
    ) -> VacancyRow {
        let row = VacancyRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            status,
            created_at: Utc::now(),
        };
        self.lock().vacancies.insert(row.id, row.clone());
        row
    }

    pub fn insert_applicant(&self, full_name: &str) -> ApplicantRow {
        let row = ApplicantRow {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            contacts: None,
            created_at: Utc::now(),
        };
        self.lock().applicants.insert(row.id, row.clone());
        row
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("store mutex poisoned")
    }
}

#[async_trait]
impl ScreeningStore for MemoryStore {
    async fn vacancy(&self, id: Uuid) -> Result<Option<VacancyRow>, StoreError> {
        Ok(self.lock().vacancies.get(&id).cloned())
    }

    async fn applicant(&self, id: Uuid) -> Result<Option<ApplicantRow>, StoreError> {
        Ok(self.lock().applicants.get(&id).cloned())
    }

    async fn resume_version(&self, id: Uuid) -> Result<Option<ResumeVersionRow>, StoreError> {
        Ok(self
            .lock()
            .resume_versions
            .iter()
            .find(|version| version.id == id)
            .cloned())
    }

    async fn current_resume_version(
        &self,
        applicant_id: Uuid,
    ) -> Result<Option<ResumeVersionRow>, StoreError> {
        Ok(self
            .lock()
            .resume_versions
            .iter()
            .find(|version| version.applicant_id == applicant_id && version.is_current)
            .cloned())
    }

    async fn register_resume_version(
        &self,
        new: NewResumeVersion,
    ) -> Result<ResumeVersionRow, StoreError> {
        let mut inner = self.lock();
        for version in inner
            .resume_versions
            .iter_mut()
            .filter(|version| version.applicant_id == new.applicant_id)
        {
            version.is_current = false;
        }
        let row = ResumeVersionRow {
            id: Uuid::new_v4(),
            applicant_id: new.applicant_id,
            storage_path: new.storage_path,
            content_hash: new.content_hash,
            is_current: true,
            created_at: Utc::now(),
        };
        inner.resume_versions.push(row.clone());
        Ok(row)
    }

    async fn create_application(
        &self,
        new: NewApplication,
    ) -> Result<JobApplicationRow, StoreError> {
        let mut inner = self.lock();
        let duplicate = inner.applications.values().any(|application| {
            application.applicant_id == new.applicant_id
                && application.vacancy_id == new.vacancy_id
        });
        if duplicate {
            return Err(StoreError::DuplicateApplication);
        }
        let now = Utc::now();
        let row = JobApplicationRow {
            id: Uuid::new_v4(),
            vacancy_id: new.vacancy_id,
            applicant_id: new.applicant_id,
            resume_version_id: new.resume_version_id,
            status: ApplicationStatus::CvReview,
            contacts: new.contacts,
            created_at: now,
            updated_at: now,
        };
        inner.applications.insert(row.id, row.clone());
        Ok(row)
    }

    async fn application(&self, id: Uuid) -> Result<Option<JobApplicationRow>, StoreError> {
        Ok(self.lock().applications.get(&id).cloned())
    }

    async fn applications_for_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<JobApplicationRow>, StoreError> {
        let mut rows: Vec<JobApplicationRow> = self
            .lock()
            .applications
            .values()
            .filter(|application| application.applicant_id == applicant_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn applications_for_vacancy(
        &self,
        vacancy_id: Uuid,
    ) -> Result<Vec<JobApplicationRow>, StoreError> {
        let mut rows: Vec<JobApplicationRow> = self
            .lock()
            .applications
            .values()
            .filter(|application| application.vacancy_id == vacancy_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn evaluations(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<CvEvaluationRow>, StoreError> {
        let mut rows: Vec<CvEvaluationRow> = self
            .lock()
            .evaluations
            .iter()
            .filter(|evaluation| evaluation.job_application_id == application_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.criterion.cmp(&b.criterion))
        });
        Ok(rows)
    }

    async fn events(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<ApplicationEventRow>, StoreError> {
        let mut rows: Vec<ApplicationEventRow> = self
            .lock()
            .events
            .iter()
            .filter(|event| event.job_application_id == application_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn record_outcome(
        &self,
        application_id: Uuid,
        expected: &[ApplicationStatus],
        outcome: &EvaluationOutcome,
    ) -> Result<JobApplicationRow, StoreError> {
        let mut inner = self.lock();
        let now = Utc::now();

        let applied = {
            let application = inner
                .applications
                .get_mut(&application_id)
                .filter(|application| expected.contains(&application.status))
                .ok_or(StoreError::StatusConflict)?;
            application.status = outcome.transition.to;
            application.updated_at = now;
            application.clone()
        };

        for evaluation in &outcome.evaluations {
            inner.evaluations.push(CvEvaluationRow {
                id: Uuid::new_v4(),
                job_application_id: application_id,
                resume_version_id: evaluation.resume_version_id,
                model: evaluation.model.clone(),
                criterion: evaluation.criterion.clone(),
                score: evaluation.score,
                strengths: evaluation.strengths.clone(),
                weaknesses: evaluation.weaknesses.clone(),
                created_at: now,
            });
        }
        inner.events.push(ApplicationEventRow {
            id: Uuid::new_v4(),
            job_application_id: application_id,
            req_type: outcome.transition.req,
            status: outcome.transition.to,
            created_at: now,
        });

        Ok(applied)
    }
}
