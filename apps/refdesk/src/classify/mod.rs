//! Message Classifier — decides whether a conversation is a referral request.
//!
//! Pure keyword and pattern matching. There is no exclusion list, so adding text
//! to a conversation can only turn a `false` into a `true`, never the reverse.

use std::sync::OnceLock;

use regex::Regex;

/// Referral, hiring and application vocabulary. Matched as lowercase substrings.
pub const REFERRAL_KEYWORDS: &[&str] = &[
    "referral",
    "refer me",
    "refer you",
    "referring",
    "job opening",
    "job posting",
    "job application",
    "job role",
    "open role",
    "open position",
    "opening at",
    "hiring",
    "recruit",
    "vacancy",
    "apply for",
    "applied for",
    "applying for",
    "application for",
    "my resume",
    "my cv",
    "curriculum vitae",
    // Bare stems last so `matched_keyword` reports the more specific phrase.
    "refer",
    "job",
    "position",
    "application",
    "resume",
    "résumé",
];

fn re_job_id_mention() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bjob[\s_-]*id\b\s*[:#]?\s*[a-z0-9][a-z0-9-]*").expect("valid regex")
    })
}

/// Returns the first keyword found in `text`, if any.
pub fn matched_keyword(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    REFERRAL_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| lower.contains(keyword))
}

/// True when `text` mentions a job identifier, e.g. `Job ID: REQ-5521`.
pub fn mentions_job_id(text: &str) -> bool {
    re_job_id_mention().is_match(text)
}

/// Classifies the concatenated text of a conversation.
pub fn is_referral_request(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    matched_keyword(text).is_some() || mentions_job_id(text)
}
