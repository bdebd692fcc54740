use serde_json::Value;
use tracing::debug;

use crate::models::{error_record, NormalizedRecord};

/// Code fence delimiter a model may wrap its JSON in
const FENCE: &str = "```";
/// Language tag allowed directly after an opening fence
const FENCE_LANG: &str = "json";

/// Reason stored in the sentinel record when a response is not a JSON object
pub const INVALID_JSON: &str = "Invalid JSON output";

/// Remove every code fence marker (```` ```json ```` and ```` ``` ````) anywhere
/// in the text, then trim surrounding whitespace.
///
/// Stripping repeats until no marker is left, so the result never contains
/// a fence and applying this twice is the same as applying it once.
pub fn clean_json(text: &str) -> String {
    let mut current = strip_fences(text);
    while current.contains(FENCE) {
        current = strip_fences(&current);
    }
    current.trim().to_string()
}

/// One left-to-right pass; at each fence the `json` tag is consumed with it.
fn strip_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find(FENCE) {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + FENCE.len()..];
        rest = after.strip_prefix(FENCE_LANG).unwrap_or(after);
    }
    out.push_str(rest);

    out
}

/// Parse text as a JSON object, returning the sentinel record on any failure.
/// Arrays and scalars are not records and fail the same way.
pub fn parse_json(text: &str) -> NormalizedRecord {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(record)) => record,
        Ok(other) => {
            debug!("Response is JSON but not an object: {}", kind_of(&other));
            error_record(INVALID_JSON)
        }
        Err(e) => {
            debug!("Response is not valid JSON: {}", e);
            error_record(INVALID_JSON)
        }
    }
}

/// De-fence then parse a raw completion. Never fails.
pub fn normalize(raw: &str) -> NormalizedRecord {
    parse_json(&clean_json(raw))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
