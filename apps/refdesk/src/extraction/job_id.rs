//! Job-id recovery. Ordered fallback chain:
//!
//! 1. `from_response` — the `job_id` field of the model's JSON answer
//! 2. `from_message_text` — regex over the raw message, used only when the
//!    model's answer could not be parsed or the call itself failed
//!
//! Both tiers emit the same canonical form: ids trimmed, de-duplicated in
//! first-seen order and joined with `"; "`.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

pub const JOB_ID_SEPARATOR: &str = "; ";

/// Words that follow "job id" in prose but are never identifiers.
const NOT_AN_ID: &[&str] = &[
    "a", "above", "an", "and", "at", "attached", "below", "for", "from", "here", "in",
    "is", "mentioned", "no", "not", "number", "of", "on", "please", "the", "there", "this",
    "to", "was", "will", "with",
];

fn re_job_id() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\bjob[\s_-]*id\b(?:\s+(?:is|number|no\.?))?\s*[:#]?\s*([a-z0-9][a-z0-9-]*(?:\s*,\s*[a-z0-9][a-z0-9-]*)*)",
        )
        .expect("valid regex")
    })
}

/// Splits on `,`/`;`, trims, drops empties and repeats, and joins canonically.
pub fn canonicalize(raw: &str) -> Option<String> {
    let mut ids: Vec<&str> = Vec::new();
    for id in raw.split([',', ';']).map(str::trim) {
        if !id.is_empty() && !ids.contains(&id) {
            ids.push(id);
        }
    }
    if ids.is_empty() {
        None
    } else {
        Some(ids.join(JOB_ID_SEPARATOR))
    }
}

/// Tier 1: reads `job_id` from a parsed model response. Strings, numbers and
/// arrays of either are accepted; null or a missing key is `None`.
pub fn from_response(object: &Map<String, Value>) -> Option<String> {
    match object.get("job_id")? {
        Value::String(s) => canonicalize(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(JOB_ID_SEPARATOR);
            canonicalize(&joined)
        }
        _ => None,
    }
}

/// Tier 2: every `Job ID:` / `JobId` mention in the message. The id right after
/// the phrase may be any alphanumeric token other than a connecting word;
/// further comma-separated ids must contain a digit.
pub fn from_message_text(text: &str) -> Option<String> {
    let ids: Vec<&str> = re_job_id()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .flat_map(|m| {
            m.as_str()
                .split(',')
                .map(str::trim)
                .enumerate()
                .filter(|(i, id)| {
                    // Items after the first comma need a digit, so trailing prose is dropped.
                    !NOT_AN_ID.contains(&id.to_lowercase().as_str())
                        && (*i == 0 || id.chars().any(|c| c.is_ascii_digit()))
                })
                .map(|(_, id)| id)
        })
        .collect();
    canonicalize(&ids.join(","))
}
