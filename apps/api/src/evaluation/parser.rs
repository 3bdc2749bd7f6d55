//! Permissive decoder for the judgment response.
//!
//! The remote model only promises "a valid JSON object" — and not reliably
//! even that — so each field degrades on its own: a missing score becomes 0,
//! a missing critique becomes empty, a missing breakdown becomes an empty
//! list, and a missing pass/fail status defaults to *fail* so unverified
//! criteria get flagged rather than silently passed. Only non-JSON input
//! fails the parse as a whole.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::evaluation::rubric::GEO_CRITERIA;

/// Accepted spellings for the critique field, in priority order.
const CRITIQUE_KEYS: [&str; 3] = ["summary_critique", "critique_summary", "critique"];
/// Accepted keys for the per-criterion breakdown object.
const BREAKDOWN_KEYS: [&str; 2] = ["analysis", "breakdown"];

/// One rubric criterion's verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionFinding {
    pub criterion: String,
    pub passed: bool,
    pub comment: String,
}

/// Normalized judgment output, ready for the view layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: i64,
    pub critique: String,
    pub breakdown: Vec<CriterionFinding>,
}

/// Parses the raw completion text into an [`EvaluationResult`].
/// Fails only when the text is not a JSON document at all.
pub fn parse_evaluation(raw: &str) -> Result<EvaluationResult, serde_json::Error> {
    let value: Value = serde_json::from_str(strip_json_fences(raw))?;

    Ok(EvaluationResult {
        score: decode_score(&value),
        critique: decode_critique(&value),
        breakdown: decode_breakdown(&value),
    })
}

fn decode_score(value: &Value) -> i64 {
    value
        .get("score")
        .and_then(Value::as_i64)
        .or_else(|| value.get("score").and_then(Value::as_f64).map(|f| f as i64))
        .unwrap_or(0)
}

fn decode_critique(value: &Value) -> String {
    CRITIQUE_KEYS
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

/// Known rubric criteria come first in canonical order; anything else the
/// model returned is appended after, so no feedback is dropped.
fn decode_breakdown(value: &Value) -> Vec<CriterionFinding> {
    let Some(entries) = BREAKDOWN_KEYS
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_object))
    else {
        return Vec::new();
    };

    let mut findings: Vec<CriterionFinding> = GEO_CRITERIA
        .iter()
        .filter_map(|criterion| {
            entries
                .get(*criterion)
                .map(|entry| decode_finding(criterion, entry))
        })
        .collect();

    for (key, entry) in entries {
        if !GEO_CRITERIA.contains(&key.as_str()) {
            findings.push(decode_finding(key, entry));
        }
    }

    findings
}

fn decode_finding(criterion: &str, entry: &Value) -> CriterionFinding {
    // Two shapes in the wild: {"present": bool, "feedback": str} and
    // {"status": "Pass"/"Fail", "comment": str}.
    let passed = entry
        .get("present")
        .and_then(Value::as_bool)
        .or_else(|| {
            entry
                .get("status")
                .and_then(Value::as_str)
                .map(|s| s.eq_ignore_ascii_case("pass"))
        })
        .unwrap_or(false);

    let comment = entry
        .get("feedback")
        .or_else(|| entry.get("comment"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    CriterionFinding {
        criterion: criterion.to_string(),
        passed,
        comment,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
/// Forced-JSON mode is requested but not trusted.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
