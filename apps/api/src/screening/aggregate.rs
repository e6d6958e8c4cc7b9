use super::evaluator::EvaluationResult;
use super::ERROR_CRITERION;
use crate::models::CvEvaluationRow;

/// Average at or above this advances the application to interview.
pub const PASS_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    AdvanceToInterview,
    Rejected,
    /// Hold the application for a human: nothing trustworthy to score.
    Wait,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub average_score: f64,
    pub decision: Decision,
}

/// Collapses a screening run into one average and one decision.
/// Deterministic: same scores in, same decision out. A parse failure always
/// decides `Wait`; scoring never guesses.
pub fn aggregate(result: &EvaluationResult) -> Aggregate {
    match result {
        EvaluationResult::ParseFailure { .. } => Aggregate {
            average_score: 0.0,
            decision: Decision::Wait,
        },
        EvaluationResult::Scored(criteria) => {
            let average_score = mean(criteria
                .iter()
                .filter(|c| c.name != ERROR_CRITERION)
                .map(|c| f64::from(c.score)));
            let decision = if average_score >= PASS_THRESHOLD {
                Decision::AdvanceToInterview
            } else {
                Decision::Rejected
            };
            Aggregate {
                average_score,
                decision,
            }
        }
    }
}

/// Average of the newest evaluation batch, for list views. A batch is the
/// set of rows sharing the latest `created_at` (they are written in one
/// transaction). `None` when the newest batch holds no scored rows, which is
/// what a failed run looks like.
pub fn latest_batch_average(rows: &[CvEvaluationRow]) -> Option<f64> {
    let latest = rows.iter().map(|row| row.created_at).max()?;
    let scores: Vec<f64> = rows
        .iter()
        .filter(|row| row.created_at == latest && row.criterion != ERROR_CRITERION)
        .map(|row| f64::from(row.score))
        .collect();
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

fn mean(scores: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = scores.fold((0.0, 0u32), |(sum, count), score| (sum + score, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}
