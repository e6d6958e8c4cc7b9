// CV Screening — prompts, the criteria evaluator and score aggregation.
//
// Everything here is deliberately side-effect free: the evaluator talks to
// the LLM and returns values, aggregation is pure math. Persistence and
// status changes live in the pipeline module.

pub mod aggregate;
pub mod evaluator;
pub mod prompts;

pub use aggregate::{aggregate, latest_batch_average, Aggregate, Decision};
pub use evaluator::{
    CriteriaEvaluator, EvaluateError, EvaluationResult, GroqEvaluator, ScoredCriterion,
};

/// Criterion name reserved for failed screening runs. Rows carrying it are
/// excluded from every average.
pub const ERROR_CRITERION: &str = "error";

/// The criteria every application is screened against.
pub const DEFAULT_CRITERIA: [&str; 3] = ["hard skills", "soft skills", "scalability mindset"];

pub fn default_criteria() -> Vec<String> {
    DEFAULT_CRITERIA.iter().map(|c| c.to_string()).collect()
}
