//! Extraction Normalizer — runs the two extraction calls and reconciles their
//! output into an `ExtractedProfile` / `ReferralReportRow`.
//!
//! Résumé call: `{name, email, phone, years_of_experience}`. A failed call or
//! unparseable answer fills all four with `PARSE_ERROR`.
//!
//! Job-id call: `{job_id}` from the conversation text, made only when there is
//! message context. Falls back to the regex tier in `job_id` on failure.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::extraction::collaborator::{Extractor, Pacer};
use crate::extraction::job_id;
use crate::extraction::parse::{parse_first_object, ParseOutcome};
use crate::extraction::prompts::{
    system_prompt, JOB_ID_PROMPT_TEMPLATE, JOB_ID_SYSTEM, RESUME_FIELDS_PROMPT_TEMPLATE,
    RESUME_FIELDS_SYSTEM,
};
use crate::extraction::truncate_resume_text;
use crate::models::report::{
    ExtractedProfile, ReferralReportRow, YearsOfExperience, NOT_FOUND, PARSE_ERROR,
};

fn re_first_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid regex"))
}

pub struct ExtractionNormalizer {
    extractor: Arc<dyn Extractor>,
    pacer: Pacer,
    max_resume_chars: usize,
}

impl ExtractionNormalizer {
    pub fn new(extractor: Arc<dyn Extractor>, delay: Duration, max_resume_chars: usize) -> Self {
        Self {
            extractor,
            pacer: Pacer::new(delay),
            max_resume_chars,
        }
    }

    /// Runs both calls and applies the required-field contract.
    pub async fn extract_row(
        &self,
        resume_text: &str,
        message_text: Option<&str>,
    ) -> ReferralReportRow {
        self.extract_profile(resume_text, message_text).await.into()
    }

    pub async fn extract_profile(
        &self,
        resume_text: &str,
        message_text: Option<&str>,
    ) -> ExtractedProfile {
        let mut profile = self.extract_resume_fields(resume_text).await;
        profile.job_id = match message_text.filter(|text| !text.trim().is_empty()) {
            Some(text) => self.extract_job_id(text).await,
            None => {
                debug!("No message context; job id left as placeholder");
                None
            }
        };
        profile
    }

    async fn call(&self, role: &str, prompt: &str) -> ParseOutcome {
        self.pacer.wait().await;
        match self.extractor.complete(&system_prompt(role), prompt).await {
            Ok(response) => {
                debug!("Extraction response: {response}");
                parse_first_object(&response)
            }
            Err(e) => ParseOutcome::ParseFailed(format!("extraction call failed: {e}")),
        }
    }

    async fn extract_resume_fields(&self, resume_text: &str) -> ExtractedProfile {
        let clipped = truncate_resume_text(resume_text, self.max_resume_chars);
        let prompt = RESUME_FIELDS_PROMPT_TEMPLATE.replace("{resume_text}", &clipped);
        match self.call(RESUME_FIELDS_SYSTEM, &prompt).await {
            ParseOutcome::Parsed(fields) => profile_from_fields(&fields),
            ParseOutcome::ParseFailed(reason) => {
                warn!("Résumé extraction unusable: {reason}");
                parse_error_profile()
            }
        }
    }

    async fn extract_job_id(&self, message_text: &str) -> Option<String> {
        let prompt = JOB_ID_PROMPT_TEMPLATE.replace("{message_text}", message_text);
        match self.call(JOB_ID_SYSTEM, &prompt).await {
            ParseOutcome::Parsed(fields) => job_id::from_response(&fields),
            ParseOutcome::ParseFailed(reason) => {
                warn!("Job id extraction unusable ({reason}); trying regex fallback");
                job_id::from_message_text(message_text)
            }
        }
    }
}

/// Every résumé field set to the parse-error placeholder. `job_id` is left to
/// the job-id call.
pub fn parse_error_profile() -> ExtractedProfile {
    ExtractedProfile {
        name: Some(PARSE_ERROR.to_string()),
        email: Some(PARSE_ERROR.to_string()),
        phone: Some(PARSE_ERROR.to_string()),
        years_of_experience: Some(YearsOfExperience::Placeholder(PARSE_ERROR.to_string())),
        job_id: None,
    }
}

/// Reads the five report fields out of a JSON object. Unknown keys are ignored.
pub fn profile_from_fields(fields: &Map<String, Value>) -> ExtractedProfile {
    ExtractedProfile {
        name: text_field(fields.get("name")),
        email: text_field(fields.get("email")),
        phone: text_field(fields.get("phone")),
        years_of_experience: years_field(fields.get("years_of_experience")),
        job_id: job_id::from_response(fields),
    }
}

/// Re-applies normalization to an existing row. A normalized row comes back unchanged.
pub fn normalize_row(row: &ReferralReportRow) -> ReferralReportRow {
    match serde_json::to_value(row) {
        Ok(Value::Object(fields)) => profile_from_fields(&fields).into(),
        _ => row.clone(),
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(|item| text_field(Some(item)))
                .collect::<Vec<_>>()
                .join("; ");
            Some(joined).filter(|s| !s.is_empty())
        }
        _ => None,
    }
}

fn years_field(value: Option<&Value>) -> Option<YearsOfExperience> {
    match value? {
        Value::Number(n) => n.as_f64().and_then(YearsOfExperience::quarter_rounded),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case(NOT_FOUND) {
                return Some(YearsOfExperience::not_found());
            }
            if s == PARSE_ERROR {
                return Some(YearsOfExperience::Placeholder(PARSE_ERROR.to_string()));
            }
            re_first_number()
                .find(s)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .and_then(YearsOfExperience::quarter_rounded)
        }
        _ => None,
    }
}
