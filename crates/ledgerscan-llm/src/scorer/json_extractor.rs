//! Lenient extraction of score results from LLM output
//!
//! Models wrap JSON in markdown fences, prepend prose, or nest the array
//! inside an object. Anything that cannot be read as a list of scores is
//! treated as an empty answer.

use ledgerscan_core::ScoreResult;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn fenced_block() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("valid fence regex"))
}

/// Extract score results from raw LLM output.
///
/// Elements without a usable `id` or `fraudScore` are skipped. Returns an
/// empty vector if no JSON can be recovered.
pub fn extract_score_results(llm_output: &str) -> Vec<ScoreResult> {
    match extract_json(llm_output) {
        Some(value) => score_results_from_value(&value),
        None => Vec::new(),
    }
}

/// Find the first parseable JSON document in the output
pub fn extract_json(llm_output: &str) -> Option<Value> {
    let cleaned = llm_output.trim();
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Some(value);
    }

    for captures in fenced_block().captures_iter(cleaned) {
        if let Some(body) = captures.get(1) {
            if let Ok(value) = serde_json::from_str::<Value>(body.as_str().trim()) {
                return Some(value);
            }
        }
    }

    extract_by_delimiters(cleaned)
}

/// Try the widest `[...]` or `{...}` span, whichever opens first
fn extract_by_delimiters(content: &str) -> Option<Value> {
    let start = content.find(['[', '{'])?;
    let close = if content[start..].starts_with('[') { ']' } else { '}' };
    let end = content.rfind(close)?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&content[start..=end]).ok()
}

fn score_results_from_value(value: &Value) -> Vec<ScoreResult> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.values().find_map(Value::as_array) {
            Some(items) => items,
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items.iter().filter_map(score_result_from_item).collect()
}

fn score_result_from_item(item: &Value) -> Option<ScoreResult> {
    let obj = item.as_object()?;
    let id = obj.get("id").and_then(as_id)?;
    let fraud_score = obj
        .get("fraudScore")
        .or_else(|| obj.get("fraud_score"))
        .and_then(as_number)?;
    let reason = obj
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Some(ScoreResult::new(id, fraud_score, reason))
}

fn as_id(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
