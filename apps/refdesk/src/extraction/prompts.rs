// Prompt constants for the two extraction calls.
// JSON-only and missing-value fragments come from llm_client::prompts.

/// System prompt for résumé field extraction.
pub const RESUME_FIELDS_SYSTEM: &str = "You are a precise assistant that extracts structured \
    contact and experience information from résumés.";

/// Résumé extraction prompt. Replace `{resume_text}` before sending.
pub const RESUME_FIELDS_PROMPT_TEMPLATE: &str = r#"Extract the following information from this résumé.

RÉSUMÉ TEXT:
{resume_text}

Return a JSON object with this EXACT schema (no extra fields):
{
  "name": "Full Name",
  "email": "email@example.com",
  "phone": "+1 555 010 0000",
  "years_of_experience": 4.75
}

Rules for years_of_experience:
- Count ONLY paid professional roles. Exclude internships, volunteer work, teaching
  assistantships, and education.
- Collapse overlapping date ranges: concurrent roles count once.
- A role marked "Present" or "Current" ends today.
- Round the total to the nearest quarter year (0.25 increments) and return a number.
"#;

/// System prompt for job-id extraction.
pub const JOB_ID_SYSTEM: &str = "You are a precise assistant that extracts job IDs from \
    messages. Return only valid JSON with a single key 'job_id'.";

/// Job-id prompt. Replace `{message_text}` before sending.
pub const JOB_ID_PROMPT_TEMPLATE: &str = r#"Extract ONLY the job ID from this message.
A job ID is typically mentioned after phrases like "Job ID:", "JobId:", "Position ID:", "Req ID:" or "Reference #:".
If multiple job IDs are present, include all of them separated by semicolons.

MESSAGE:
{message_text}

Return a JSON object with this EXACT schema:
{"job_id": "REQ-12345"}
"#;

/// Builds the full system prompt for a call: role, JSON-only rule, missing-value rule.
pub fn system_prompt(role: &str) -> String {
    use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, MISSING_VALUE_INSTRUCTION};
    format!("{role} {JSON_ONLY_SYSTEM} {MISSING_VALUE_INSTRUCTION}")
}
