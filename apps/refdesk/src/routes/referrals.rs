use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::acquisition::orchestrator::is_eligible_attachment;
use crate::classify::{is_referral_request, matched_keyword};
use crate::errors::AppError;
use crate::identity::identity_key;
use crate::models::conversation::ConversationRecord;
use crate::models::report::ReferralReportRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ClassifyRequest {
    pub records: Vec<ConversationRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub sender: String,
    pub identity_key: String,
    pub is_potential_referral: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,
    pub eligible_attachments: Vec<String>,
    pub drive_links: Vec<String>,
    pub emails: Vec<String>,
}

#[derive(Deserialize)]
pub struct ExtractRequest {
    pub resume_text: String,
    #[serde(default)]
    pub message_text: Option<String>,
}

/// POST /api/v1/referrals/classify
/// Classification and source discovery only; nothing is downloaded.
pub async fn handle_classify(
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<Vec<ClassifiedRecord>>, AppError> {
    if req.records.is_empty() {
        return Err(AppError::Validation("records must not be empty".to_string()));
    }
    let classified = req.records.iter().map(classify_record).collect();
    Ok(Json(classified))
}

fn classify_record(record: &ConversationRecord) -> ClassifiedRecord {
    let sender = record.display_identity();
    let text = record.full_text();
    ClassifiedRecord {
        sender: sender.to_string(),
        identity_key: identity_key(sender),
        is_potential_referral: is_referral_request(&text),
        matched_keyword: matched_keyword(&text).map(str::to_string),
        eligible_attachments: record
            .attachments()
            .filter(|a| is_eligible_attachment(a))
            .map(|a| a.filename.clone())
            .collect(),
        drive_links: record.drive_links().map(str::to_string).collect(),
        emails: record.emails().map(str::to_string).collect(),
    }
}

/// POST /api/v1/referrals/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ReferralReportRow>, AppError> {
    if req.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text must not be empty".to_string()));
    }
    let row = state
        .normalizer
        .extract_row(&req.resume_text, req.message_text.as_deref())
        .await;
    Ok(Json(row))
}
