//! Resume scoring against a job description, via one LLM call per resume.

use serde_json::Value;
use tracing::warn;

use crate::llm_client::CompletionModel;
use crate::models::candidate::CandidateRecord;
use crate::screening::prompts::{RESUME_ANALYSIS_PROMPT_TEMPLATE, RESUME_ANALYSIS_SYSTEM};

const REQUIRED_KEYS: [&str; 4] = ["name", "email", "score", "summary"];

/// Scores one resume against the job description.
///
/// Exactly one completion call is made. Any transport, parse, or shape
/// failure logs and returns `None`, so one bad resume cannot abort a batch.
pub async fn score_resume(
    llm: &dyn CompletionModel,
    resume_text: &str,
    job_description: &str,
) -> Option<CandidateRecord> {
    let prompt = RESUME_ANALYSIS_PROMPT_TEMPLATE
        .replace("{job_description}", job_description)
        .replace("{resume_text}", resume_text);

    let raw = match llm.complete(RESUME_ANALYSIS_SYSTEM, &prompt).await {
        Ok(text) => text,
        Err(e) => {
            warn!("resume analysis call failed: {e}");
            return None;
        }
    };

    parse_analysis(&raw)
}

/// Parses and validates the model's reply into a `CandidateRecord`.
///
/// The model may wrap its JSON in prose despite instructions; everything
/// between the first `{` and the last `}` is treated as the object. The key
/// set must be exactly {name, email, score, summary}, the score numeric in
/// [0, 100], and the remaining fields strings.
pub fn parse_analysis(raw: &str) -> Option<CandidateRecord> {
    let json_str = match extract_json_object(raw) {
        Some(s) => s,
        None => {
            warn!("no JSON object found in analysis reply: {raw}");
            return None;
        }
    };

    let value: Value = match serde_json::from_str(json_str) {
        Ok(v) => v,
        Err(e) => {
            warn!("analysis reply is not valid JSON: {e}");
            return None;
        }
    };

    let obj = match value.as_object() {
        Some(obj) => obj,
        None => {
            warn!("analysis reply is not a JSON object");
            return None;
        }
    };

    if obj.len() != REQUIRED_KEYS.len() || REQUIRED_KEYS.iter().any(|k| !obj.contains_key(*k)) {
        warn!(
            "analysis reply has the wrong key set: {:?}",
            obj.keys().collect::<Vec<_>>()
        );
        return None;
    }

    let score = match obj.get("score").and_then(Value::as_f64) {
        Some(s) if (0.0..=100.0).contains(&s) => s,
        _ => {
            warn!("analysis reply score is invalid: {}", obj["score"]);
            return None;
        }
    };

    let name = string_field(obj, "name")?;
    let email = string_field(obj, "email")?;
    let summary = string_field(obj, "summary")?;

    Some(CandidateRecord {
        name,
        email,
        score,
        summary,
    })
}

fn string_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key).and_then(Value::as_str) {
        Some(s) => Some(s.to_string()),
        None => {
            warn!("analysis reply field '{key}' is not a string");
            None
        }
    }
}

/// Returns the slice between the first `{` and the last `}`, inclusive.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
