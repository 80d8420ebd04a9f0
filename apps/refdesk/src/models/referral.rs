use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where an acquired résumé came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Attachment,
    DriveLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeStatus {
    AcquiredViaAttachment,
    AcquiredViaDriveLink,
    NotFound,
}

impl From<Provenance> for ResumeStatus {
    fn from(value: Provenance) -> Self {
        match value {
            Provenance::Attachment => ResumeStatus::AcquiredViaAttachment,
            Provenance::DriveLink => ResumeStatus::AcquiredViaDriveLink,
        }
    }
}

/// One failed attempt at a résumé source, kept for the "no résumé found" summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub provenance: Provenance,
    /// Attachment filename or drive URL.
    pub source: String,
    pub reason: String,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.provenance {
            Provenance::Attachment => "attachment",
            Provenance::DriveLink => "drive link",
        };
        write!(f, "{kind} {}: {}", self.source, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquiredResume {
    pub path: PathBuf,
    pub provenance: Provenance,
}

/// Result of running the acquisition orchestrator over one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionReport {
    pub acquired: Option<AcquiredResume>,
    pub failures: Vec<SourceFailure>,
}

impl AcquisitionReport {
    pub fn status(&self) -> ResumeStatus {
        self.acquired
            .as_ref()
            .map(|resume| resume.provenance.into())
            .unwrap_or(ResumeStatus::NotFound)
    }
}

/// Per-conversation view derived once from a `ConversationRecord`.
///
/// Only `resume_status`, `acquired` and `failures` are filled in later, by
/// `attach_acquisition`, and only once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralCandidate {
    pub sender: String,
    pub is_potential_referral: bool,
    pub resolved_identity_key: String,
    pub resume_status: Option<ResumeStatus>,
    pub acquired: Option<AcquiredResume>,
    pub failures: Vec<SourceFailure>,
}

impl ReferralCandidate {
    pub fn new(sender: &str, is_potential_referral: bool, identity_key: String) -> Self {
        Self {
            sender: sender.to_string(),
            is_potential_referral,
            resolved_identity_key: identity_key,
            resume_status: None,
            acquired: None,
            failures: Vec::new(),
        }
    }

    pub fn attach_acquisition(&mut self, report: AcquisitionReport) {
        if self.resume_status.is_some() {
            return;
        }
        self.resume_status = Some(report.status());
        self.acquired = report.acquired;
        self.failures = report.failures;
    }

    pub fn has_resume(&self) -> bool {
        self.acquired.is_some()
    }
}
