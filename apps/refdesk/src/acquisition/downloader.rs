//! Download collaborator — fetches one résumé source into the store.
//!
//! `HttpDownloader` is the production backend. The orchestrator only sees the
//! `Downloader` trait, so tests swap in a counting fake.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use tracing::debug;

const DRIVE_HOST: &str = "drive.google.com";
const PDF_MAGIC: &[u8] = b"%PDF";

/// One source to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadRequest {
    /// An attachment the scraper already saved to disk.
    LocalCopy { path: PathBuf },
    /// An attachment URL; `auth` is forwarded as the `Cookie` header.
    AttachmentUrl { url: String, auth: Option<String> },
    /// A drive-style share link.
    DriveLink { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded(PathBuf),
    DownloadFailed(String),
}

#[async_trait]
pub trait Downloader: Send + Sync {
    /// Writes the source to `destination`. Must fail, not overwrite, when
    /// `destination` already exists.
    async fn download(&self, request: &DownloadRequest, destination: &Path) -> DownloadOutcome;
}

/// Rewrites a drive share link to its direct-download form.
///
/// Supported: `https://drive.google.com/file/d/<id>/view…` and
/// `https://drive.google.com/open?id=<id>`.
pub fn drive_download_url(link: &str) -> Result<String, String> {
    let url = Url::parse(link.trim()).map_err(|e| format!("invalid URL: {e}"))?;
    if url.host_str() != Some(DRIVE_HOST) {
        return Err("not a Google Drive URL".to_string());
    }

    let from_path = url.path_segments().and_then(|segments| {
        let segments: Vec<&str> = segments.collect();
        segments
            .windows(3)
            .find(|w| w[0] == "file" && w[1] == "d" && !w[2].is_empty())
            .map(|w| w[2].to_string())
    });
    let file_id = from_path.or_else(|| {
        url.query_pairs()
            .find(|(k, v)| k == "id" && !v.is_empty())
            .map(|(_, v)| v.into_owned())
    });

    match file_id {
        Some(id) => Ok(format!(
            "https://{DRIVE_HOST}/uc?export=download&id={id}"
        )),
        None => Err("unsupported Google Drive URL format".to_string()),
    }
}

/// Writes `bytes` to a fresh temp file next to `destination`, then moves it
/// into place without clobbering an existing file.
fn persist_new_file(destination: &Path, bytes: &[u8]) -> Result<PathBuf, String> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err("content is not a PDF".to_string());
    }
    let dir = destination
        .parent()
        .ok_or_else(|| "destination has no parent directory".to_string())?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| e.to_string())?;
    tmp.write_all(bytes).map_err(|e| e.to_string())?;
    tmp.persist_noclobber(destination)
        .map_err(|e| format!("could not save {}: {}", destination.display(), e.error))?;
    Ok(destination.to_path_buf())
}

#[derive(Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str, auth: Option<&str>) -> Result<Vec<u8>, String> {
        let mut request = self.client.get(url);
        if let Some(cookie) = auth {
            request = request.header(header::COOKIE, cookie);
        }
        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("failed to download file: HTTP {}", status.as_u16()));
        }
        let body = response.bytes().await.map_err(|e| e.to_string())?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }

    async fn read_local(path: &Path) -> Result<Vec<u8>, String> {
        tokio::fs::read(path)
            .await
            .map_err(|e| format!("could not read {}: {e}", path.display()))
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, request: &DownloadRequest, destination: &Path) -> DownloadOutcome {
        let bytes = match request {
            DownloadRequest::LocalCopy { path } => Self::read_local(path).await,
            DownloadRequest::AttachmentUrl { url, auth } => self.fetch(url, auth.as_deref()).await,
            DownloadRequest::DriveLink { url } => match drive_download_url(url) {
                Ok(direct) => self.fetch(&direct, None).await,
                Err(reason) => Err(reason),
            },
        };

        let destination = destination.to_path_buf();
        let written = match bytes {
            Ok(bytes) => {
                tokio::task::spawn_blocking(move || persist_new_file(&destination, &bytes))
                    .await
                    .unwrap_or_else(|e| Err(format!("write task failed: {e}")))
            }
            Err(reason) => Err(reason),
        };

        match written {
            Ok(path) => DownloadOutcome::Downloaded(path),
            Err(reason) => DownloadOutcome::DownloadFailed(reason),
        }
    }
}
