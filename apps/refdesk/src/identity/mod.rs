//! Identity keys — normalized name strings used to line up résumé files with
//! the conversations they came from.
//!
//! The same key is used to name files in the résumé store (`<key>_resume.pdf`)
//! and, after `normalize`, to compare names in the resolver.

pub mod resolver;

use std::sync::OnceLock;

use regex::Regex;

pub use resolver::{resolve, CandidateSet, MatchTier};

const UNKNOWN_KEY: &str = "Unknown";

fn is_separator(c: char) -> bool {
    c == '_' || c == '-' || c == '.' || c.is_whitespace()
}

/// Builds the file-safe identity key for a display name: whitespace runs become
/// a single `_`, and anything that is not a letter, digit, `_`, `-` or `.` is dropped.
/// Case is preserved so filenames stay readable.
pub fn identity_key(name: &str) -> String {
    let joined = name.split_whitespace().collect::<Vec<_>>().join("_");
    let key: String = joined
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    let key = key.trim_matches(|c| c == '.' || c == '_').to_string();
    if key.is_empty() {
        UNKNOWN_KEY.to_string()
    } else {
        key
    }
}

/// Lowercases and collapses every separator run to one space.
pub fn normalize(key: &str) -> String {
    key.split(is_separator)
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn tokens(key: &str) -> Vec<String> {
    normalize(key)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// The part of `key` before its first separator, lowercased.
pub fn first_token(key: &str) -> Option<String> {
    key.trim_matches(is_separator)
        .split(is_separator)
        .next()
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn re_named_resume() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(.+?)_resume(?:_\d+)?\.pdf$").expect("valid regex"))
}

fn re_plain_pdf() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(.+?)\.pdf$").expect("valid regex"))
}

/// Recovers the identity key from a résumé filename.
///
/// `Jane_Doe_resume.pdf` and `Jane_Doe_resume_2.pdf` → `Jane_Doe`; any other
/// `Name.pdf` → `Name`. Non-PDF names yield `None`.
pub fn key_from_resume_filename(filename: &str) -> Option<String> {
    [re_named_resume(), re_plain_pdf()]
        .iter()
        .find_map(|re| re.captures(filename))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
