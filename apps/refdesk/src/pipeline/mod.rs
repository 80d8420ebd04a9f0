//! The referral pipeline: classify → acquire → extract → normalize → report.
//!
//! Records are processed strictly one at a time. Anything that goes wrong for
//! a single record is logged and recorded on its candidate; only missing input
//! or an unusable résumé store stops a run.

pub mod input;

use std::path::Path;

use tracing::{info, warn};

use crate::acquisition::{AcquisitionOrchestrator, ResumeStore};
use crate::classify::is_referral_request;
use crate::errors::AppError;
use crate::extraction::{ExtractionNormalizer, ResumeReader};
use crate::identity::{identity_key, key_from_resume_filename, CandidateSet};
use crate::models::conversation::ConversationRecord;
use crate::models::referral::ReferralCandidate;
use crate::models::report::ReferralReportRow;
use crate::report::ReportAssembler;

/// Conversation text per identity key. Records sharing a key have their text
/// concatenated in input order.
pub fn message_index(records: &[ConversationRecord]) -> CandidateSet<String> {
    let mut index = CandidateSet::new();
    for record in records {
        index.upsert_with(
            identity_key(record.display_identity()),
            record.full_text(),
            |existing: &mut String, text| {
                existing.push('\n');
                existing.push_str(&text);
            },
        );
    }
    index
}

/// Outcome of classification and acquisition over a batch.
#[derive(Debug, Default)]
pub struct ScanSummary {
    pub total: usize,
    /// One candidate per referral request, in input order.
    pub referrals: Vec<ReferralCandidate>,
}

impl ScanSummary {
    pub fn acquired(&self) -> impl Iterator<Item = &ReferralCandidate> {
        self.referrals.iter().filter(|c| c.has_resume())
    }

    pub fn not_found(&self) -> impl Iterator<Item = &ReferralCandidate> {
        self.referrals.iter().filter(|c| !c.has_resume())
    }

    pub fn log(&self) {
        info!(
            "Scanned {} conversations: {} referral requests, {} résumés acquired",
            self.total,
            self.referrals.len(),
            self.acquired().count()
        );
        for candidate in self.not_found() {
            if candidate.failures.is_empty() {
                warn!("No résumé found for {}: no résumé source in conversation", candidate.sender);
            }
            for failure in &candidate.failures {
                warn!("No résumé found for {}: {failure}", candidate.sender);
            }
        }
    }
}

/// Classifies every record and acquires a résumé for each referral.
pub async fn scan(
    orchestrator: &AcquisitionOrchestrator<'_>,
    records: &[ConversationRecord],
) -> ScanSummary {
    let mut summary = ScanSummary {
        total: records.len(),
        referrals: Vec::new(),
    };

    for (i, record) in records.iter().enumerate() {
        if let Some(candidate) = scan_record(orchestrator, record, i, records.len()).await {
            summary.referrals.push(candidate);
        }
    }
    summary
}

/// Classifies one record and, for a referral, acquires its résumé.
async fn scan_record(
    orchestrator: &AcquisitionOrchestrator<'_>,
    record: &ConversationRecord,
    position: usize,
    total: usize,
) -> Option<ReferralCandidate> {
    let sender = record.display_identity();
    let is_referral = is_referral_request(&record.full_text());
    info!(
        "[{}/{total}] {sender}: {}",
        position + 1,
        if is_referral { "referral request" } else { "not a referral" }
    );
    if !is_referral {
        return None;
    }

    let mut candidate = ReferralCandidate::new(sender, true, identity_key(sender));
    let report = orchestrator
        .acquire(record, &candidate.resolved_identity_key)
        .await;
    candidate.attach_acquisition(report);
    Some(candidate)
}

/// Extraction over stored résumés. Holds the one shared normalizer.
pub struct Pipeline<'a> {
    normalizer: &'a ExtractionNormalizer,
    reader: &'a dyn ResumeReader,
    store: &'a ResumeStore,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        normalizer: &'a ExtractionNormalizer,
        reader: &'a dyn ResumeReader,
        store: &'a ResumeStore,
    ) -> Self {
        Self {
            normalizer,
            reader,
            store,
        }
    }

    /// Full run, record by record: each referral is classified, acquired and
    /// extracted before the next record is looked at.
    pub async fn run(
        &self,
        orchestrator: &AcquisitionOrchestrator<'_>,
        records: &[ConversationRecord],
    ) -> (ScanSummary, ReportAssembler) {
        let index = message_index(records);
        let mut summary = ScanSummary {
            total: records.len(),
            referrals: Vec::new(),
        };
        let mut report = ReportAssembler::new();

        for (i, record) in records.iter().enumerate() {
            let Some(candidate) = scan_record(orchestrator, record, i, records.len()).await else {
                continue;
            };
            if let Some(resume) = candidate.acquired.as_ref() {
                if let Some(row) = self.extract_from_file(&resume.path, &index).await {
                    report.push(row);
                }
            }
            summary.referrals.push(candidate);
        }
        (summary, report)
    }

    /// Extracts a row for every PDF already in the store.
    pub async fn analyze(
        &self,
        records: &[ConversationRecord],
    ) -> Result<ReportAssembler, AppError> {
        let index = message_index(records);
        let files = self.store.list_resumes()?;
        info!("Analyzing {} résumés in {}", files.len(), self.store.dir().display());

        let mut report = ReportAssembler::new();
        for path in files {
            if let Some(row) = self.extract_from_file(&path, &index).await {
                report.push(row);
            }
        }
        Ok(report)
    }

    /// Reads one stored résumé, finds its conversation by filename, and runs
    /// extraction. `None` when the file yields no text.
    async fn extract_from_file(
        &self,
        path: &Path,
        index: &CandidateSet<String>,
    ) -> Option<ReferralReportRow> {
        let filename = path.file_name()?.to_string_lossy().into_owned();
        let key = key_from_resume_filename(&filename).unwrap_or_else(|| filename.clone());

        let text = match self.reader.read_text(path).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("No text extracted from {filename}; skipping");
                return None;
            }
            Err(reason) => {
                warn!("Skipping {filename}: {reason}");
                return None;
            }
        };

        let message = match index.resolve(&key) {
            Some((matched, message, tier)) => {
                info!("Matched {filename} to conversation {matched} ({tier:?})");
                Some(message.as_str())
            }
            None => {
                warn!("No conversation matches {filename}; job id will be left empty");
                None
            }
        };

        Some(self.normalizer.extract_row(&text, message).await)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::acquisition::downloader::{DownloadOutcome, DownloadRequest, Downloader};
    use crate::extraction::collaborator::Extractor;
    use crate::llm_client::LlmError;
    use crate::models::conversation::{AttachmentRef, MessageItem};
    use crate::models::referral::{Provenance, ResumeStatus};
    use crate::models::report::{YearsOfExperience, NOT_FOUND};

    /// Succeeds for URLs containing "ok" and writes a stub PDF.
    #[derive(Default)]
    struct FakeDownloader {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl Downloader for FakeDownloader {
        async fn download(&self, request: &DownloadRequest, destination: &Path) -> DownloadOutcome {
            *self.calls.lock().unwrap() += 1;
            let url = match request {
                DownloadRequest::AttachmentUrl { url, .. } | DownloadRequest::DriveLink { url } => {
                    url.clone()
                }
                DownloadRequest::LocalCopy { path } => path.to_string_lossy().into_owned(),
            };
            if url.contains("ok") {
                std::fs::write(destination, b"%PDF-1.4").unwrap();
                DownloadOutcome::Downloaded(destination.to_path_buf())
            } else {
                DownloadOutcome::DownloadFailed("failed to download file: HTTP 404".to_string())
            }
        }
    }

    /// Returns canned text per filename; unknown files read as empty.
    #[derive(Default)]
    struct FakeReader {
        texts: HashMap<String, String>,
    }

    #[async_trait]
    impl ResumeReader for FakeReader {
        async fn read_text(&self, path: &Path) -> Result<String, String> {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            Ok(self.texts.get(&name).cloned().unwrap_or_default())
        }
    }

    struct ScriptedExtractor {
        responses: Mutex<VecDeque<String>>,
        inputs: Mutex<Vec<String>>,
    }

    impl ScriptedExtractor {
        fn new(responses: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
                inputs: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Extractor for ScriptedExtractor {
        async fn complete(&self, _instructions: &str, input: &str) -> Result<String, LlmError> {
            self.inputs.lock().unwrap().push(input.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(LlmError::EmptyContent)
        }
    }

    fn john_smith() -> ConversationRecord {
        ConversationRecord {
            sender: "John Smith".to_string(),
            messages: vec![MessageItem {
                content: "Hi! I'd love a referral for Job ID: REQ-5521. I've attached my resume.pdf"
                    .to_string(),
                attachments: vec![AttachmentRef {
                    filename: "resume.pdf".to_string(),
                    source_url: Some("https://files.example/ok/resume.pdf".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn chit_chat() -> ConversationRecord {
        ConversationRecord {
            sender: "Ada Lovelace".to_string(),
            messages: vec![MessageItem {
                content: "Great talk yesterday, thanks!".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    struct Harness {
        _dir: tempfile::TempDir,
        store: ResumeStore,
        downloader: FakeDownloader,
        reader: FakeReader,
        extractor: Arc<ScriptedExtractor>,
        normalizer: ExtractionNormalizer,
    }

    impl Harness {
        fn new(responses: &[&str], texts: &[(&str, &str)]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = ResumeStore::open(dir.path().join("resumes")).unwrap();
            let extractor = ScriptedExtractor::new(responses);
            let normalizer =
                ExtractionNormalizer::new(extractor.clone(), Duration::ZERO, 10_000);
            Self {
                _dir: dir,
                store,
                downloader: FakeDownloader::default(),
                reader: FakeReader {
                    texts: texts
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                },
                extractor,
                normalizer,
            }
        }

        fn pipeline(&self) -> Pipeline<'_> {
            Pipeline::new(&self.normalizer, &self.reader, &self.store)
        }

        fn orchestrator(&self) -> AcquisitionOrchestrator<'_> {
            AcquisitionOrchestrator::new(&self.downloader, &self.store)
        }

        async fn run(&self, records: &[ConversationRecord]) -> (ScanSummary, ReportAssembler) {
            self.pipeline().run(&self.orchestrator(), records).await
        }
    }

    #[test]
    fn test_message_index_merges_same_identity() {
        let mut again = john_smith();
        again.messages[0].content = "Following up".to_string();
        let index = message_index(&[john_smith(), chit_chat(), again]);

        assert_eq!(index.len(), 2);
        let (key, text, _) = index.resolve("John_Smith").unwrap();
        assert_eq!(key, "John_Smith");
        assert!(text.contains("REQ-5521"));
        assert!(text.ends_with("Following up\n"));
    }

    #[tokio::test]
    async fn test_end_to_end_attachment_referral() {
        let harness = Harness::new(
            &[
                r#"{"name": "John Smith", "email": "", "phone": null, "years_of_experience": 3.4}"#,
                r#"Sure: {"job_id": "REQ-5521"}"#,
            ],
            &[("John_Smith_resume.pdf", "John Smith\nSoftware Engineer 2020-2023")],
        );
        let (summary, report) = harness.run(&[chit_chat(), john_smith()]).await;

        assert_eq!(summary.total, 2);
        assert_eq!(summary.referrals.len(), 1);
        let candidate = &summary.referrals[0];
        assert_eq!(candidate.resolved_identity_key, "John_Smith");
        assert_eq!(
            candidate.resume_status,
            Some(ResumeStatus::AcquiredViaAttachment)
        );
        let acquired = candidate.acquired.as_ref().unwrap();
        assert_eq!(acquired.provenance, Provenance::Attachment);
        assert!(acquired.path.ends_with("John_Smith_resume.pdf"));

        assert_eq!(
            report.rows(),
            &[ReferralReportRow {
                name: "John Smith".to_string(),
                email: NOT_FOUND.to_string(),
                phone: NOT_FOUND.to_string(),
                years_of_experience: YearsOfExperience::Years(3.5),
                job_id: "REQ-5521".to_string(),
            }]
        );
        let inputs = harness.extractor.inputs.lock().unwrap();
        assert_eq!(inputs.len(), 2);
        assert!(inputs[1].contains("REQ-5521"));
    }

    type CallLog = Arc<Mutex<Vec<String>>>;

    struct LoggingDownloader {
        log: CallLog,
    }

    #[async_trait]
    impl Downloader for LoggingDownloader {
        async fn download(&self, _request: &DownloadRequest, destination: &Path) -> DownloadOutcome {
            let name = destination.file_name().unwrap().to_string_lossy().into_owned();
            self.log.lock().unwrap().push(format!("download {name}"));
            std::fs::write(destination, b"%PDF-1.4").unwrap();
            DownloadOutcome::Downloaded(destination.to_path_buf())
        }
    }

    struct LoggingExtractor {
        log: CallLog,
    }

    #[async_trait]
    impl Extractor for LoggingExtractor {
        async fn complete(&self, _instructions: &str, input: &str) -> Result<String, LlmError> {
            if input.starts_with("Extract ONLY the job ID") {
                self.log.lock().unwrap().push("extract job id".to_string());
                Ok(r#"{"job_id": "Not found"}"#.to_string())
            } else {
                self.log.lock().unwrap().push("extract résumé".to_string());
                Ok(r#"{"name": "Someone"}"#.to_string())
            }
        }
    }

    fn referral_from(sender: &str) -> ConversationRecord {
        ConversationRecord {
            sender: sender.to_string(),
            messages: vec![MessageItem {
                content: "Could you refer me? My resume is attached.".to_string(),
                attachments: vec![AttachmentRef {
                    filename: "resume.pdf".to_string(),
                    source_url: Some("https://files.example/resume.pdf".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_run_finishes_each_record_before_the_next() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResumeStore::open(dir.path()).unwrap();
        let log: CallLog = Arc::default();
        let downloader = LoggingDownloader { log: log.clone() };
        let extractor = Arc::new(LoggingExtractor { log: log.clone() });
        let normalizer = ExtractionNormalizer::new(extractor, Duration::ZERO, 10_000);
        let reader = FakeReader {
            texts: [
                ("Ann_Lee_resume.pdf".to_string(), "Ann Lee".to_string()),
                ("Bo_Kim_resume.pdf".to_string(), "Bo Kim".to_string()),
            ]
            .into_iter()
            .collect(),
        };
        let orchestrator = AcquisitionOrchestrator::new(&downloader, &store);

        let (summary, report) = Pipeline::new(&normalizer, &reader, &store)
            .run(&orchestrator, &[referral_from("Ann Lee"), referral_from("Bo Kim")])
            .await;

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "download Ann_Lee_resume.pdf",
                "extract résumé",
                "extract job id",
                "download Bo_Kim_resume.pdf",
                "extract résumé",
                "extract job id",
            ]
        );
        assert_eq!(summary.referrals.len(), 2);
        assert_eq!(report.len(), 2);
    }

    #[tokio::test]
    async fn test_end_to_end_failed_drive_link_is_not_found() {
        let harness = Harness::new(&[], &[]);
        let record = ConversationRecord {
            sender: "Priya Patel".to_string(),
            messages: vec![MessageItem {
                content: "Could you refer me? Here is my CV.".to_string(),
                google_drive_links: vec![
                    "https://drive.google.com/file/d/gone/view".to_string()
                ],
                ..Default::default()
            }],
            ..Default::default()
        };
        let (summary, report) = harness.run(&[record]).await;

        assert!(report.is_empty());
        assert_eq!(summary.acquired().count(), 0);
        let missing: Vec<_> = summary.not_found().collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].resume_status, Some(ResumeStatus::NotFound));
        assert_eq!(missing[0].failures.len(), 1);
        assert_eq!(missing[0].failures[0].provenance, Provenance::DriveLink);
        assert!(missing[0].failures[0].reason.contains("404"));
        assert!(harness.extractor.inputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_referrals_are_never_acquired() {
        let harness = Harness::new(&[], &[]);
        let mut record = chit_chat();
        record.messages[0].attachments = vec![AttachmentRef {
            filename: "slides.pdf".to_string(),
            source_url: Some("https://files.example/ok/slides.pdf".to_string()),
            ..Default::default()
        }];
        let summary = scan(&harness.orchestrator(), &[record]).await;

        assert!(summary.referrals.is_empty());
        assert_eq!(*harness.downloader.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_resume_text_skips_extraction() {
        let harness = Harness::new(&[], &[]);
        let (summary, report) = harness.run(&[john_smith()]).await;

        assert_eq!(summary.acquired().count(), 1);
        assert!(report.is_empty());
        assert!(harness.extractor.inputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_unmatched_file_skips_job_id_call() {
        let harness = Harness::new(
            &[r#"{"name": "Grace Hopper", "years_of_experience": "12 years"}"#],
            &[("Grace_Hopper_resume.pdf", "Grace Hopper, Navy 1943-1986")],
        );
        std::fs::write(harness.store.path_for("Grace_Hopper_resume.pdf"), b"%PDF").unwrap();
        let report = harness.pipeline().analyze(&[chit_chat()]).await.unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report.rows()[0].name, "Grace Hopper");
        assert_eq!(
            report.rows()[0].years_of_experience,
            YearsOfExperience::Years(12.0)
        );
        assert_eq!(report.rows()[0].job_id, NOT_FOUND);
        assert_eq!(harness.extractor.inputs.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_matches_messages_by_filename() {
        let harness = Harness::new(
            &[r#"{"name": "John Smith"}"#, r#"{"job_id": ["REQ-5521", "REQ-9"]}"#],
            &[("john_smith_resume_2.pdf", "John Smith")],
        );
        std::fs::write(harness.store.path_for("john_smith_resume_2.pdf"), b"%PDF").unwrap();
        let report = harness.pipeline().analyze(&[john_smith()]).await.unwrap();

        assert_eq!(report.rows()[0].job_id, "REQ-5521; REQ-9");
    }
}
