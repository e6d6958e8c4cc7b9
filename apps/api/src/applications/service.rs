use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    ApplicationEventRow, ApplicationStatus, CvEvaluationRow, JobApplicationRow, VacancyStatus,
};
use crate::pipeline::{review_transition, EvaluationOutcome, ReviewDecision};
use crate::screening::latest_batch_average;
use crate::store::{NewApplication, ScreeningStore};

pub struct SubmitApplication {
    pub vacancy_id: Uuid,
    pub applicant_id: Uuid,
    pub contact: Option<String>,
}

/// Validate and persist a new application in `cvReview`. The caller queues
/// the screening job after this returns; nothing here talks to the model.
pub async fn submit_application(
    store: &dyn ScreeningStore,
    req: &SubmitApplication,
) -> Result<JobApplicationRow, AppError> {
    let vacancy = store
        .vacancy(req.vacancy_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vacancy {} not found", req.vacancy_id)))?;
    if vacancy.status != VacancyStatus::Active {
        return Err(AppError::Validation(format!(
            "Vacancy '{}' is not accepting applications",
            vacancy.name
        )));
    }

    let applicant = store
        .applicant(req.applicant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Applicant {} not found", req.applicant_id)))?;

    let resume = store
        .current_resume_version(applicant.id)
        .await?
        .ok_or_else(|| {
            AppError::Validation("Applicant has no current resume version".to_string())
        })?;

    let application = store
        .create_application(NewApplication {
            vacancy_id: vacancy.id,
            applicant_id: applicant.id,
            resume_version_id: resume.id,
            contacts: req.contact.clone(),
        })
        .await?;

    info!(
        "Application {} created for vacancy '{}' (applicant {})",
        application.id, vacancy.name, applicant.id
    );
    Ok(application)
}

#[derive(Serialize)]
pub struct ApplicationDetail {
    pub application: JobApplicationRow,
    pub events: Vec<ApplicationEventRow>,
    pub evaluations: Vec<CvEvaluationRow>,
}

/// Full view of one application: current row, audit trail, every
/// evaluation batch (newest first).
pub async fn application_detail(
    store: &dyn ScreeningStore,
    id: Uuid,
) -> Result<ApplicationDetail, AppError> {
    let application = store
        .application(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;
    let events = store.events(id).await?;
    let evaluations = store.evaluations(id).await?;
    Ok(ApplicationDetail {
        application,
        events,
        evaluations,
    })
}

#[derive(Serialize)]
pub struct ApplicantApplication {
    pub id: Uuid,
    pub vacancy_id: Uuid,
    pub vacancy_name: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Applications of one applicant across vacancies.
pub async fn applications_for_applicant(
    store: &dyn ScreeningStore,
    applicant_id: Uuid,
) -> Result<Vec<ApplicantApplication>, AppError> {
    store
        .applicant(applicant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Applicant {applicant_id} not found")))?;

    let rows = store.applications_for_applicant(applicant_id).await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let vacancy = store
            .vacancy(row.vacancy_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vacancy {} not found", row.vacancy_id)))?;
        out.push(ApplicantApplication {
            id: row.id,
            vacancy_id: row.vacancy_id,
            vacancy_name: vacancy.name,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        });
    }
    Ok(out)
}

#[derive(Serialize)]
pub struct VacancyApplication {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub applicant_name: String,
    pub status: ApplicationStatus,
    /// Mean of the most recent evaluation batch; None before screening
    /// finishes or when the batch holds only an error row.
    pub average_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Review list for one vacancy, with each applicant's latest screening
/// average.
pub async fn applications_for_vacancy(
    store: &dyn ScreeningStore,
    vacancy_id: Uuid,
) -> Result<Vec<VacancyApplication>, AppError> {
    store
        .vacancy(vacancy_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vacancy {vacancy_id} not found")))?;

    let rows = store.applications_for_vacancy(vacancy_id).await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let applicant = store
            .applicant(row.applicant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Applicant {} not found", row.applicant_id)))?;
        let evaluations = store.evaluations(row.id).await?;
        out.push(VacancyApplication {
            id: row.id,
            applicant_id: row.applicant_id,
            applicant_name: applicant.full_name,
            status: row.status,
            average_score: latest_batch_average(&evaluations),
            created_at: row.created_at,
        });
    }
    Ok(out)
}

/// Apply an HR decision. Allowed only while the application sits in
/// `interview` or `waitResult`; the status write and its event land in one
/// transaction, and a concurrent status change surfaces as a conflict
/// instead of a double transition.
pub async fn review_application(
    store: &dyn ScreeningStore,
    id: Uuid,
    decision: ReviewDecision,
) -> Result<JobApplicationRow, AppError> {
    let application = store
        .application(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;

    let transition = review_transition(application.status, decision)
        .map_err(|err| AppError::UnprocessableEntity(err.to_string()))?;

    let updated = store
        .record_outcome(
            id,
            &[ApplicationStatus::Interview, ApplicationStatus::WaitResult],
            &EvaluationOutcome::review(transition),
        )
        .await?;

    info!("Application {} reviewed: now {:?}", id, updated.status);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::{aggregate, EvaluationResult, ScoredCriterion};
    use crate::store::memory::MemoryStore;
    use crate::store::NewResumeVersion;

    struct Seed {
        vacancy_id: Uuid,
        applicant_id: Uuid,
    }

    async fn seed(store: &MemoryStore, vacancy_status: VacancyStatus, with_resume: bool) -> Seed {
        let vacancy = store.insert_vacancy("Platform Engineer", "Rust services.", vacancy_status);
        let applicant = store.insert_applicant("Noor Haddad");
        if with_resume {
            store
                .register_resume_version(NewResumeVersion {
                    applicant_id: applicant.id,
                    storage_path: "/data/resumes/noor.txt".to_string(),
                    content_hash: "hash".to_string(),
                })
                .await
                .unwrap();
        }
        Seed {
            vacancy_id: vacancy.id,
            applicant_id: applicant.id,
        }
    }

    fn apply_request(seed: &Seed) -> SubmitApplication {
        SubmitApplication {
            vacancy_id: seed.vacancy_id,
            applicant_id: seed.applicant_id,
            contact: Some("noor@example.com".to_string()),
        }
    }

    /// Move a freshly created application out of cvReview the way a real
    /// screening run would.
    async fn screen_into_interview(store: &MemoryStore, application: &JobApplicationRow) {
        let result = EvaluationResult::Scored(vec![ScoredCriterion {
            name: "hard skills".to_string(),
            score: 80,
            strengths: vec![],
            weaknesses: vec![],
        }]);
        let agg = aggregate(&result);
        let outcome =
            EvaluationOutcome::from_result(application.resume_version_id, "m", result, &agg);
        store
            .record_outcome(application.id, &[ApplicationStatus::CvReview], &outcome)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_submit_creates_cv_review_application() {
        let store = MemoryStore::new();
        let seed = seed(&store, VacancyStatus::Active, true).await;

        let application = submit_application(&store, &apply_request(&seed)).await.unwrap();

        assert_eq!(application.status, ApplicationStatus::CvReview);
        assert_eq!(application.vacancy_id, seed.vacancy_id);
        assert_eq!(application.contacts.as_deref(), Some("noor@example.com"));
    }

    #[tokio::test]
    async fn test_submit_rejects_inactive_vacancy() {
        let store = MemoryStore::new();
        let seed = seed(&store, VacancyStatus::Closed, true).await;

        let err = submit_application(&store, &apply_request(&seed)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_submit_rejects_unknown_vacancy() {
        let store = MemoryStore::new();
        let seed = seed(&store, VacancyStatus::Active, true).await;
        let req = SubmitApplication {
            vacancy_id: Uuid::new_v4(),
            ..apply_request(&seed)
        };

        let err = submit_application(&store, &req).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_submit_requires_current_resume() {
        let store = MemoryStore::new();
        let seed = seed(&store, VacancyStatus::Active, false).await;

        let err = submit_application(&store, &apply_request(&seed)).await.unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("resume")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_second_application_for_same_vacancy_conflicts() {
        let store = MemoryStore::new();
        let seed = seed(&store, VacancyStatus::Active, true).await;

        submit_application(&store, &apply_request(&seed)).await.unwrap();
        let err = submit_application(&store, &apply_request(&seed)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_racing_duplicates_leave_one_application() {
        let store = MemoryStore::new();
        let seed = seed(&store, VacancyStatus::Active, true).await;

        let first_request = apply_request(&seed);
        let second_request = apply_request(&seed);
        let (first, second) = tokio::join!(
            submit_application(&store, &first_request),
            submit_application(&store, &second_request),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(AppError::Conflict(_)))));

        let survivors = store
            .applications_for_vacancy(seed.vacancy_id)
            .await
            .unwrap();
        assert_eq!(survivors.len(), 1);
    }

    #[tokio::test]
    async fn test_review_approves_from_interview() {
        let store = MemoryStore::new();
        let seed = seed(&store, VacancyStatus::Active, true).await;
        let application = submit_application(&store, &apply_request(&seed)).await.unwrap();
        screen_into_interview(&store, &application).await;

        let updated = review_application(&store, application.id, ReviewDecision::Approve)
            .await
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Approved);

        // Screening event plus the review event.
        let events = store.events(application.id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].status, ApplicationStatus::Approved);
    }

    #[tokio::test]
    async fn test_review_rejects_applications_still_in_screening() {
        let store = MemoryStore::new();
        let seed = seed(&store, VacancyStatus::Active, true).await;
        let application = submit_application(&store, &apply_request(&seed)).await.unwrap();

        let err = review_application(&store, application.id, ReviewDecision::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));

        let reloaded = store.application(application.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, ApplicationStatus::CvReview);
    }

    #[tokio::test]
    async fn test_vacancy_list_carries_latest_average() {
        let store = MemoryStore::new();
        let seed = seed(&store, VacancyStatus::Active, true).await;
        let application = submit_application(&store, &apply_request(&seed)).await.unwrap();
        screen_into_interview(&store, &application).await;

        let list = applications_for_vacancy(&store, seed.vacancy_id).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].applicant_name, "Noor Haddad");
        assert_eq!(list[0].status, ApplicationStatus::Interview);
        let average = list[0].average_score.unwrap();
        assert!((average - 80.0).abs() < 1e-9, "Average was {average}");
    }

    #[tokio::test]
    async fn test_applicant_list_names_the_vacancy() {
        let store = MemoryStore::new();
        let seed = seed(&store, VacancyStatus::Active, true).await;
        submit_application(&store, &apply_request(&seed)).await.unwrap();

        let list = applications_for_applicant(&store, seed.applicant_id).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].vacancy_name, "Platform Engineer");
        assert_eq!(list[0].status, ApplicationStatus::CvReview);
    }

    #[tokio::test]
    async fn test_detail_view_includes_history() {
        let store = MemoryStore::new();
        let seed = seed(&store, VacancyStatus::Active, true).await;
        let application = submit_application(&store, &apply_request(&seed)).await.unwrap();
        screen_into_interview(&store, &application).await;

        let detail = application_detail(&store, application.id).await.unwrap();
        assert_eq!(detail.application.status, ApplicationStatus::Interview);
        assert_eq!(detail.events.len(), 1);
        assert_eq!(detail.evaluations.len(), 1);
    }
}
