//! Locates the JSON object inside a model response.
//!
//! The model is told to answer with bare JSON, but responses still arrive with
//! code fences or a sentence of preamble. The first well-formed object wins.

use serde_json::{Map, Value};

use crate::llm_client::strip_json_fences;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(Map<String, Value>),
    ParseFailed(String),
}

impl ParseOutcome {
    #[cfg(test)]
    pub fn parsed(self) -> Option<Map<String, Value>> {
        match self {
            ParseOutcome::Parsed(map) => Some(map),
            ParseOutcome::ParseFailed(_) => None,
        }
    }
}

/// Finds and parses the first well-formed JSON object in `response`.
///
/// Candidates are brace-balanced spans. A span that fails to parse is skipped
/// whole, so an object nested inside it is never returned. An unterminated
/// span ends the search.
pub fn parse_first_object(response: &str) -> ParseOutcome {
    let text = strip_json_fences(response);
    if text.is_empty() {
        return ParseOutcome::ParseFailed("empty response".to_string());
    }

    let mut last_error = None;
    let mut pos = 0;
    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        let Some(end) = balanced_span_end(text, start) else {
            last_error = Some("unterminated JSON object".to_string());
            break;
        };
        match serde_json::from_str::<Value>(&text[start..end]) {
            Ok(Value::Object(map)) => return ParseOutcome::Parsed(map),
            Ok(_) => {}
            Err(e) => last_error = Some(e.to_string()),
        }
        pos = end;
    }

    ParseOutcome::ParseFailed(
        last_error.unwrap_or_else(|| "no JSON object in response".to_string()),
    )
}

/// Byte index just past the `}` closing the `{` at `start`. Braces inside
/// string literals are ignored.
fn balanced_span_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
