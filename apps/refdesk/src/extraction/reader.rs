use std::path::Path;

use async_trait::async_trait;

/// Turns a stored résumé file into plain text.
#[async_trait]
pub trait ResumeReader: Send + Sync {
    async fn read_text(&self, path: &Path) -> Result<String, String>;
}

/// Text extraction via `pdf-extract`, run on the blocking pool.
pub struct PdfTextReader;

#[async_trait]
impl ResumeReader for PdfTextReader {
    async fn read_text(&self, path: &Path) -> Result<String, String> {
        let path = path.to_path_buf();
        let display = path.display().to_string();
        tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
            .await
            .map_err(|e| format!("text extraction for {display} panicked: {e}"))?
            .map_err(|e| format!("could not extract text from {display}: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreadable_pdf_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken_resume.pdf");
        std::fs::write(&path, b"%PDF-1.4 truncated").unwrap();
        let err = PdfTextReader.read_text(&path).await.unwrap_err();
        assert!(err.contains("broken_resume.pdf"));
    }
}
