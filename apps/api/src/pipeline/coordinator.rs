//! Background execution of screening runs.
//!
//! Nothing escapes a run: errors and panics alike are logged and the
//! application is parked in `waitResult` with an error evaluation.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use super::lifecycle::EvaluationOutcome;
use super::runner::{run_screening, PipelineError};
use crate::models::{ApplicationStatus, JobApplicationRow};
use crate::screening::CriteriaEvaluator;
use crate::store::{ScreeningStore, StoreError};

/// A request to screen one application.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationJob {
    pub application_id: Uuid,
}

/// Owns the evaluator and fans screening runs out onto the runtime.
/// Submitting a job returns immediately; HTTP handlers never wait for the
/// model.
#[derive(Clone)]
pub struct ScreeningCoordinator {
    store: Arc<dyn ScreeningStore>,
    evaluator: Arc<dyn CriteriaEvaluator>,
    model: String,
    criteria: Vec<String>,
}

impl ScreeningCoordinator {
    pub fn new(
        store: Arc<dyn ScreeningStore>,
        evaluator: Arc<dyn CriteriaEvaluator>,
        model: impl Into<String>,
        criteria: Vec<String>,
    ) -> Self {
        Self {
            store,
            evaluator,
            model: model.into(),
            criteria,
        }
    }

    /// Spawn a screening run for `job`. The handle is returned for callers
    /// that need completion; handlers drop it.
    pub fn submit(&self, job: EvaluationJob) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move { coordinator.run(job).await })
    }

    async fn run(&self, job: EvaluationJob) {
        let application = match self.store.application(job.application_id).await {
            Ok(Some(application)) => application,
            Ok(None) => {
                error!(
                    "Screening job references unknown application {}",
                    job.application_id
                );
                return;
            }
            Err(e) => {
                error!(
                    "Failed to load application {} for screening: {}",
                    job.application_id, e
                );
                return;
            }
        };

        // The screening body gets its own task: a panic in the evaluator,
        // extractor or store resolves to a JoinError here instead of
        // unwinding the submit task before anything is recorded.
        let coordinator = self.clone();
        let subject = application.clone();
        let screened = tokio::spawn(async move {
            run_screening(
                coordinator.store.as_ref(),
                coordinator.evaluator.as_ref(),
                &coordinator.model,
                &coordinator.criteria,
                &subject,
            )
            .await
        })
        .await;

        match screened {
            Ok(Ok(summary)) => {
                info!(
                    "Screening finished for application {}: average {:.1}, decision {:?}, status {:?}",
                    application.id, summary.average_score, summary.decision, summary.status
                );
            }
            Ok(Err(PipelineError::Store(StoreError::StatusConflict))) => {
                info!(
                    "Screening for application {} skipped, status moved on concurrently",
                    application.id
                );
            }
            Ok(Err(e)) => {
                error!("Screening failed for application {}: {}", application.id, e);
                self.record_failure(&application, &e.to_string()).await;
            }
            Err(join_err) => {
                error!(
                    "Screening task for application {} crashed: {}",
                    application.id, join_err
                );
                self.record_failure(&application, &format!("screening crashed: {join_err}"))
                    .await;
            }
        }
    }

    /// Park the application in `waitResult` with an error evaluation so
    /// reviewers can see why screening produced no scores.
    async fn record_failure(&self, application: &JobApplicationRow, reason: &str) {
        let outcome =
            EvaluationOutcome::from_failure(application.resume_version_id, &self.model, reason);
        if let Err(e) = self
            .store
            .record_outcome(application.id, &[ApplicationStatus::CvReview], &outcome)
            .await
        {
            error!(
                "Could not record screening failure for application {}: {}",
                application.id, e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReqType, VacancyStatus};
    use crate::screening::{
        default_criteria, EvaluateError, EvaluationResult, ScoredCriterion, ERROR_CRITERION,
    };
    use crate::store::memory::MemoryStore;
    use crate::store::{NewApplication, NewResumeVersion};
    use async_trait::async_trait;
    use std::io::Write;

    struct FixedScores(&'static [(&'static str, u8)]);

    #[async_trait]
    impl CriteriaEvaluator for FixedScores {
        async fn evaluate(
            &self,
            _job_description: &str,
            _resume_text: &str,
            _criteria: &[String],
        ) -> Result<EvaluationResult, EvaluateError> {
            Ok(EvaluationResult::Scored(
                self.0
                    .iter()
                    .map(|(name, score)| ScoredCriterion {
                        name: name.to_string(),
                        score: *score,
                        strengths: vec![],
                        weaknesses: vec![],
                    })
                    .collect(),
            ))
        }
    }

    struct PanickingEvaluator;

    #[async_trait]
    impl CriteriaEvaluator for PanickingEvaluator {
        async fn evaluate(
            &self,
            _job_description: &str,
            _resume_text: &str,
            _criteria: &[String],
        ) -> Result<EvaluationResult, EvaluateError> {
            panic!("model adapter blew up");
        }
    }

    fn resume_file(text: &str) -> tempfile::TempPath {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file.into_temp_path()
    }

    async fn seeded(store: &MemoryStore, resume_path: &str) -> JobApplicationRow {
        let vacancy = store.insert_vacancy(
            "Data Engineer",
            "Pipelines, SQL, orchestration.",
            VacancyStatus::Active,
        );
        let applicant = store.insert_applicant("Sam Okafor");
        let version = store
            .register_resume_version(NewResumeVersion {
                applicant_id: applicant.id,
                storage_path: resume_path.to_string(),
                content_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        store
            .create_application(NewApplication {
                vacancy_id: vacancy.id,
                applicant_id: applicant.id,
                resume_version_id: version.id,
                contacts: None,
            })
            .await
            .unwrap()
    }

    fn coordinator(
        store: Arc<MemoryStore>,
        evaluator: Arc<dyn CriteriaEvaluator>,
    ) -> ScreeningCoordinator {
        ScreeningCoordinator::new(store, evaluator, "test-model", default_criteria())
    }

    #[tokio::test]
    async fn test_submit_screens_in_background() {
        let store = Arc::new(MemoryStore::new());
        let path = resume_file("Eight years of data engineering.");
        let application = seeded(&store, path.to_str().unwrap()).await;
        let coordinator = coordinator(
            store.clone(),
            Arc::new(FixedScores(&[("hard skills", 90), ("soft skills", 70)])),
        );

        let handle = coordinator.submit(EvaluationJob {
            application_id: application.id,
        });
        handle.await.unwrap();

        let reloaded = store.application(application.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, ApplicationStatus::Interview);
        assert_eq!(store.evaluations(application.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_extraction_failure_parks_in_wait_result() {
        let store = Arc::new(MemoryStore::new());
        // Path that no test ever creates.
        let application = seeded(&store, "/nonexistent/resume.pdf").await;
        let coordinator = coordinator(store.clone(), Arc::new(FixedScores(&[("hard skills", 90)])));

        coordinator
            .submit(EvaluationJob {
                application_id: application.id,
            })
            .await
            .unwrap();

        let reloaded = store.application(application.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, ApplicationStatus::WaitResult);

        let evaluations = store.evaluations(application.id).await.unwrap();
        assert_eq!(evaluations.len(), 1);
        assert_eq!(evaluations[0].criterion, ERROR_CRITERION);
        assert!(evaluations[0].weaknesses[0].contains("extraction"));

        let events = store.events(application.id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].req_type, ReqType::Wait);
        assert_eq!(events[0].status, ApplicationStatus::WaitResult);
    }

    #[tokio::test]
    async fn test_evaluator_panic_parks_in_wait_result() {
        let store = Arc::new(MemoryStore::new());
        let path = resume_file("Nine years of platform work.");
        let application = seeded(&store, path.to_str().unwrap()).await;
        let coordinator = coordinator(store.clone(), Arc::new(PanickingEvaluator));

        let handle = coordinator.submit(EvaluationJob {
            application_id: application.id,
        });
        // The submit task itself must survive the panic.
        handle.await.unwrap();

        let reloaded = store.application(application.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, ApplicationStatus::WaitResult);

        let evaluations = store.evaluations(application.id).await.unwrap();
        assert_eq!(evaluations.len(), 1);
        assert_eq!(evaluations[0].criterion, ERROR_CRITERION);
        assert!(evaluations[0].weaknesses[0].contains("crashed"));

        let events = store.events(application.id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].req_type, ReqType::Wait);
        assert_eq!(events[0].status, ApplicationStatus::WaitResult);
    }

    #[tokio::test]
    async fn test_unknown_application_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = coordinator(store, Arc::new(FixedScores(&[("hard skills", 90)])));

        coordinator
            .submit(EvaluationJob {
                application_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_completed_application_is_not_rescreened() {
        let store = Arc::new(MemoryStore::new());
        let path = resume_file("Eight years of data engineering.");
        let application = seeded(&store, path.to_str().unwrap()).await;
        let coordinator = coordinator(store.clone(), Arc::new(FixedScores(&[("hard skills", 90)])));
        let job = EvaluationJob {
            application_id: application.id,
        };

        coordinator.submit(job).await.unwrap();
        coordinator.submit(job).await.unwrap();

        let reloaded = store.application(application.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, ApplicationStatus::Interview);
        assert_eq!(store.evaluations(application.id).await.unwrap().len(), 1);
        assert_eq!(store.events(application.id).await.unwrap().len(), 1);
    }
}
