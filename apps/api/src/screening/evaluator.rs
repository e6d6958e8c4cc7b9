//! Criteria evaluation against the LLM.
//!
//! `CriteriaEvaluator` is the seam the pipeline depends on; `GroqEvaluator`
//! is the production implementation. Output the model produced but we could
//! not read is NOT an error: it becomes `EvaluationResult::ParseFailure` and
//! the caller decides what that means for the application.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::prompts;
use crate::llm_client::{LlmClient, LlmError};

#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error("no completion API credential is configured")]
    MissingApiKey,

    #[error("criteria list is empty, nothing to score")]
    CriteriaEmpty,

    #[error("evaluation unavailable: {0}")]
    Unavailable(String),
}

/// One criterion's verdict after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCriterion {
    pub name: String,
    pub score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// What a screening run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationResult {
    Scored(Vec<ScoredCriterion>),
    /// The model answered but the answer held no readable JSON object.
    ParseFailure { raw_model_output: String },
}

#[async_trait]
pub trait CriteriaEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        job_description: &str,
        resume_text: &str,
        criteria: &[String],
    ) -> Result<EvaluationResult, EvaluateError>;
}

/// Production evaluator backed by the Groq chat client.
pub struct GroqEvaluator {
    llm: LlmClient,
}

impl GroqEvaluator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }
}

#[async_trait]
impl CriteriaEvaluator for GroqEvaluator {
    async fn evaluate(
        &self,
        job_description: &str,
        resume_text: &str,
        criteria: &[String],
    ) -> Result<EvaluationResult, EvaluateError> {
        if criteria.is_empty() {
            return Err(EvaluateError::CriteriaEmpty);
        }

        let user_prompt = prompts::build_eval_prompt(job_description, resume_text, criteria);
        let raw = match self.llm.complete(prompts::SCREENING_SYSTEM, &user_prompt).await {
            Ok(raw) => raw,
            Err(LlmError::MissingApiKey) => return Err(EvaluateError::MissingApiKey),
            Err(err) => return Err(EvaluateError::Unavailable(err.to_string())),
        };

        Ok(parse_model_output(raw.trim()))
    }
}

/// The outermost `{ ... }` span. Models wrap JSON in prose and code fences;
/// everything outside the braces is noise.
fn extract_outer_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse and normalize model output. Malformed entries are dropped, scores
/// are clamped to 0..=100, strengths/weaknesses keep only non-empty trimmed
/// strings. A missing `criteria` key is an empty result, not a failure.
fn parse_model_output(raw: &str) -> EvaluationResult {
    let Some(span) = extract_outer_json(raw) else {
        return EvaluationResult::ParseFailure {
            raw_model_output: raw.to_string(),
        };
    };
    let value: Value = match serde_json::from_str(span) {
        Ok(value) => value,
        Err(_) => {
            return EvaluationResult::ParseFailure {
                raw_model_output: raw.to_string(),
            }
        }
    };

    let scored = value
        .get("criteria")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(normalize_entry).collect())
        .unwrap_or_default();

    EvaluationResult::Scored(scored)
}

fn normalize_entry(entry: &Value) -> Option<ScoredCriterion> {
    let object = entry.as_object()?;
    let name = object
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    Some(ScoredCriterion {
        name,
        score: coerce_score(object.get("score")),
        strengths: string_list(object.get("strengths")),
        weaknesses: string_list(object.get("weaknesses")),
    })
}

fn coerce_score(value: Option<&Value>) -> u8 {
    let raw = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    };
    raw.clamp(0, 100) as u8
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
