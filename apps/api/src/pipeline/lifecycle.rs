//! The application state machine.
//!
//! Applications move `cvReview -> interview -> approved` on the happy path,
//! drop to `rejected` on a failing score or HR verdict, and park in
//! `waitResult` when screening itself failed and a human has to look.
//! Every status change carries a request type (`next`, `reject`, `wait`)
//! into the append-only event log.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ApplicationStatus, ReqType};
use crate::screening::{Aggregate, Decision, EvaluationResult, ScoredCriterion, ERROR_CRITERION};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("application in status {current:?} cannot be reviewed")]
    NotReviewable { current: ApplicationStatus },
}

/// A status change plus the request kind recorded with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub to: ApplicationStatus,
    pub req: ReqType,
}

/// Scoring decision -> lifecycle transition.
pub fn decision_transition(decision: Decision) -> Transition {
    match decision {
        Decision::AdvanceToInterview => Transition {
            to: ApplicationStatus::Interview,
            req: ReqType::Next,
        },
        Decision::Rejected => Transition {
            to: ApplicationStatus::Rejected,
            req: ReqType::Reject,
        },
        // Unreadable model output parks the application where it was,
        // flagged for a human by the wait event.
        Decision::Wait => Transition {
            to: ApplicationStatus::CvReview,
            req: ReqType::Wait,
        },
    }
}

/// Where an application goes when the screening task itself failed.
pub fn failure_transition() -> Transition {
    Transition {
        to: ApplicationStatus::WaitResult,
        req: ReqType::Wait,
    }
}

/// HR verdict on an application that survived screening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// HR may only decide applications sitting in `interview` or `waitResult`.
pub fn review_transition(
    current: ApplicationStatus,
    decision: ReviewDecision,
) -> Result<Transition, LifecycleError> {
    match current {
        ApplicationStatus::Interview | ApplicationStatus::WaitResult => Ok(match decision {
            ReviewDecision::Approve => Transition {
                to: ApplicationStatus::Approved,
                req: ReqType::Next,
            },
            ReviewDecision::Reject => Transition {
                to: ApplicationStatus::Rejected,
                req: ReqType::Reject,
            },
        }),
        current => Err(LifecycleError::NotReviewable { current }),
    }
}

/// An evaluation row before ids and timestamps exist.
#[derive(Debug, Clone)]
pub struct NewEvaluation {
    pub resume_version_id: Uuid,
    pub model: String,
    pub criterion: String,
    pub score: i32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Everything one screening run wants persisted. The store applies it
/// atomically: evaluation rows, status update and event land together or
/// not at all.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub evaluations: Vec<NewEvaluation>,
    pub transition: Transition,
}

impl EvaluationOutcome {
    /// Outcome of a run that got an answer out of the model.
    pub fn from_result(
        resume_version_id: Uuid,
        model: &str,
        result: EvaluationResult,
        aggregate: &Aggregate,
    ) -> Self {
        match result {
            EvaluationResult::Scored(criteria) => Self {
                evaluations: criteria
                    .into_iter()
                    .map(|criterion| NewEvaluation::scored(resume_version_id, model, criterion))
                    .collect(),
                transition: decision_transition(aggregate.decision),
            },
            EvaluationResult::ParseFailure { .. } => Self {
                evaluations: vec![NewEvaluation::error(
                    resume_version_id,
                    model,
                    "model output could not be parsed as JSON",
                )],
                transition: decision_transition(Decision::Wait),
            },
        }
    }

    /// Outcome of a run that failed outright (extraction, transport,
    /// storage): one `error` row, parked at `waitResult`.
    pub fn from_failure(resume_version_id: Uuid, model: &str, message: &str) -> Self {
        Self {
            evaluations: vec![NewEvaluation::error(resume_version_id, model, message)],
            transition: failure_transition(),
        }
    }

    /// A review writes no evaluation rows, only the transition.
    pub fn review(transition: Transition) -> Self {
        Self {
            evaluations: vec![],
            transition,
        }
    }
}

impl NewEvaluation {
    fn scored(resume_version_id: Uuid, model: &str, criterion: ScoredCriterion) -> Self {
        Self {
            resume_version_id,
            model: model.to_string(),
            criterion: criterion.name,
            score: i32::from(criterion.score),
            strengths: criterion.strengths,
            weaknesses: criterion.weaknesses,
        }
    }

    fn error(resume_version_id: Uuid, model: &str, message: &str) -> Self {
        Self {
            resume_version_id,
            model: model.to_string(),
            criterion: ERROR_CRITERION.to_string(),
            score: 0,
            strengths: vec![],
            weaknesses: vec![message.to_string()],
        }
    }
}
