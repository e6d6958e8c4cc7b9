//! Prompt templates for CV screening.
//!
//! Criterion names are injected verbatim and the model is told to echo them
//! back in the `name` field, so evaluation rows line up with the configured
//! criteria without any fuzzy matching.

/// System prompt: strict scorer persona plus the JSON-only output contract.
pub const SCREENING_SYSTEM: &str = r#"You assess how well a resume matches a vacancy, strictly against the given criteria. Do not invent facts. For each criterion: score 0..100 (0 = no evidence, 100 = full match), strengths are confirmed positives, weaknesses are risks or gaps.
Return STRICTLY one JSON object with no text outside it, with the structure: {
  "criteria": [ { "name": str, "score": int, "strengths": [str], "weaknesses": [str] } ]
}. No text other than JSON."#;

const EVAL_TEMPLATE: &str = "Vacancy:
{job}

Resume:
{cv}

Evaluation criteria (use these names verbatim in the name field):
{criteria}

For each criterion: set a score 0..100, list 2-5 strengths (specific, confirmed facts) and 2-5 weaknesses (gaps or risks). If there is no information for a criterion, give it a low score and add 'no data' to its weaknesses.";

pub fn build_eval_prompt(job_description: &str, resume_text: &str, criteria: &[String]) -> String {
    let bullets = criteria
        .iter()
        .map(|c| format!("- {c}"))
        .collect::<Vec<_>>()
        .join("\n");
    EVAL_TEMPLATE
        .replace("{job}", job_description.trim())
        .replace("{cv}", resume_text.trim())
        .replace("{criteria}", &bullets)
}
