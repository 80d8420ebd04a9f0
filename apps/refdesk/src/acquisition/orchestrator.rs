//! Résumé Acquisition Orchestrator.
//!
//! Source priority: eligible attachments in order, then drive links in order.
//! Each source is attempted exactly once and the first success ends the scan.
//! Every attempted source consumes the next filename ordinal, so a second
//! attempt for the same identity never lands on the first one's path.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::acquisition::downloader::{DownloadOutcome, DownloadRequest, Downloader};
use crate::acquisition::store::{resume_filename, ResumeStore};
use crate::models::conversation::{AttachmentRef, ConversationRecord};
use crate::models::referral::{AcquiredResume, AcquisitionReport, Provenance, SourceFailure};

fn re_resume_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(resume|résumé|curriculum|vitae|(^|[^a-z])cv([^a-z]|$))")
            .expect("valid regex")
    })
}

/// An attachment is a résumé candidate when its name looks like one, it is a
/// PDF, or the scraper already flagged it.
pub fn is_eligible_attachment(attachment: &AttachmentRef) -> bool {
    let name = attachment.filename.trim();
    attachment.is_resume
        || re_resume_name().is_match(name)
        || name.to_lowercase().ends_with(".pdf")
}

pub struct AcquisitionOrchestrator<'a> {
    downloader: &'a dyn Downloader,
    store: &'a ResumeStore,
    attachment_auth: Option<String>,
}

impl<'a> AcquisitionOrchestrator<'a> {
    pub fn new(downloader: &'a dyn Downloader, store: &'a ResumeStore) -> Self {
        Self {
            downloader,
            store,
            attachment_auth: None,
        }
    }

    /// Auth context forwarded on attachment URL downloads.
    pub fn with_attachment_auth(mut self, auth: Option<String>) -> Self {
        self.attachment_auth = auth;
        self
    }

    pub async fn acquire(
        &self,
        record: &ConversationRecord,
        identity_key: &str,
    ) -> AcquisitionReport {
        let mut failures = Vec::new();
        let mut ordinal = 0;

        for attachment in record.attachments().filter(|a| is_eligible_attachment(a)) {
            ordinal += 1;
            let source = attachment.filename.clone();
            let request = match self.attachment_request(attachment) {
                Ok(request) => request,
                Err(reason) => {
                    warn!("Skipping attachment {source} for {identity_key}: {reason}");
                    failures.push(SourceFailure {
                        provenance: Provenance::Attachment,
                        source,
                        reason,
                    });
                    continue;
                }
            };
            match self.attempt(&request, identity_key, ordinal).await {
                Ok(acquired) => {
                    info!("Saved résumé for {identity_key} from attachment {source}");
                    return AcquisitionReport {
                        acquired: Some(AcquiredResume {
                            path: acquired,
                            provenance: Provenance::Attachment,
                        }),
                        failures,
                    };
                }
                Err(reason) => {
                    warn!("Attachment {source} for {identity_key} failed: {reason}");
                    failures.push(SourceFailure {
                        provenance: Provenance::Attachment,
                        source,
                        reason,
                    });
                }
            }
        }

        for link in record.drive_links() {
            ordinal += 1;
            let request = DownloadRequest::DriveLink {
                url: link.to_string(),
            };
            match self.attempt(&request, identity_key, ordinal).await {
                Ok(acquired) => {
                    info!("Saved résumé for {identity_key} from drive link {link}");
                    return AcquisitionReport {
                        acquired: Some(AcquiredResume {
                            path: acquired,
                            provenance: Provenance::DriveLink,
                        }),
                        failures,
                    };
                }
                Err(reason) => {
                    warn!("Drive link {link} for {identity_key} failed: {reason}");
                    failures.push(SourceFailure {
                        provenance: Provenance::DriveLink,
                        source: link.to_string(),
                        reason,
                    });
                }
            }
        }

        if failures.is_empty() {
            info!("No résumé source found for {identity_key}");
        }
        AcquisitionReport {
            acquired: None,
            failures,
        }
    }

    fn attachment_request(&self, attachment: &AttachmentRef) -> Result<DownloadRequest, String> {
        if let Some(path) = attachment.saved_path.as_ref().filter(|p| p.is_file()) {
            return Ok(DownloadRequest::LocalCopy { path: path.clone() });
        }
        match attachment.source_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => Ok(DownloadRequest::AttachmentUrl {
                url: url.to_string(),
                auth: self.attachment_auth.clone(),
            }),
            None if attachment.saved_path.is_some() => {
                Err("saved attachment file is missing".to_string())
            }
            None => Err("attachment has no saved copy or source URL".to_string()),
        }
    }

    async fn attempt(
        &self,
        request: &DownloadRequest,
        identity_key: &str,
        ordinal: usize,
    ) -> Result<std::path::PathBuf, String> {
        let filename = resume_filename(identity_key, ordinal);
        let destination = self.store.path_for(&filename);
        if destination.exists() {
            return Err(format!("{filename} already exists in the résumé store"));
        }
        match self.downloader.download(request, &destination).await {
            DownloadOutcome::Downloaded(path) => Ok(path),
            DownloadOutcome::DownloadFailed(reason) => Err(reason),
        }
    }
}
