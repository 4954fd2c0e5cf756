//! Reduces the backend's match payload, whatever its shape, to the canonical
//! ordered sequence of `MatchResult`. Never fails: unrecognized payloads and
//! unreadable elements are dropped with a warning.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::MatchResult;

/// Recognized payload shapes, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `[ {...}, ... ]`
    BareList,
    /// `{ "matches": [ ... ] }`
    Matches,
    /// `{ "results": [ ... ] }`
    Results,
    Unrecognized,
}

fn locate(payload: &Value) -> (PayloadShape, Option<&Vec<Value>>) {
    if let Some(items) = payload.as_array() {
        return (PayloadShape::BareList, Some(items));
    }
    if let Some(items) = payload.get("matches").and_then(Value::as_array) {
        return (PayloadShape::Matches, Some(items));
    }
    if let Some(items) = payload.get("results").and_then(Value::as_array) {
        return (PayloadShape::Results, Some(items));
    }
    (PayloadShape::Unrecognized, None)
}

pub fn detect_shape(payload: &Value) -> PayloadShape {
    locate(payload).0
}

pub fn normalize(payload: &Value) -> Vec<MatchResult> {
    let (shape, items) = locate(payload);
    let Some(items) = items else {
        warn!(
            shape = ?shape,
            payload = %truncate(&payload.to_string(), 200),
            "unexpected match response format"
        );
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match MatchResult::deserialize(item) {
            Ok(result) => sanitize(result, index),
            Err(e) => {
                warn!(index, error = %e, "skipping unreadable match element");
                None
            }
        })
        .collect()
}

fn sanitize(mut result: MatchResult, index: usize) -> Option<MatchResult> {
    if !result.score.is_finite() {
        warn!(index, filename = %result.filename, "skipping match with non-numeric score");
        return None;
    }
    if !(0.0..=100.0).contains(&result.score) {
        warn!(index, score = result.score, "clamping out-of-range match score");
        result.score = result.score.clamp(0.0, 100.0);
    }
    Some(result)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
