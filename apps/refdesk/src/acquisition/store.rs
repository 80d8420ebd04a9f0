use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::AppError;

/// The résumé directory. Files are written once and never overwritten.
#[derive(Debug, Clone)]
pub struct ResumeStore {
    dir: PathBuf,
}

impl ResumeStore {
    /// Opens the store, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        if !dir.is_dir() {
            std::fs::create_dir_all(&dir)
                .map_err(|e| AppError::StoreUnavailable(format!("{}: {e}", dir.display())))?;
            info!("Created résumé store at {}", dir.display());
        }
        Ok(Self { dir })
    }

    /// Opens an existing store without creating it.
    pub fn existing(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(AppError::StoreUnavailable(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// All PDFs in the store, sorted by filename.
    pub fn list_resumes(&self) -> Result<Vec<PathBuf>, AppError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.dir)
            .map_err(|e| AppError::StoreUnavailable(format!("{}: {e}", self.dir.display())))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_pdf_extension(path))
            .collect();
        files.sort();
        Ok(files)
    }
}

/// `<key>_resume.pdf` for the first source of a conversation, then
/// `<key>_resume_2.pdf`, `<key>_resume_3.pdf`, …
pub fn resume_filename(identity_key: &str, ordinal: usize) -> String {
    if ordinal <= 1 {
        format!("{identity_key}_resume.pdf")
    } else {
        format!("{identity_key}_resume_{ordinal}.pdf")
    }
}

pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_filename_ordinals() {
        assert_eq!(resume_filename("John_Smith", 1), "John_Smith_resume.pdf");
        assert_eq!(resume_filename("John_Smith", 2), "John_Smith_resume_2.pdf");
        assert_eq!(resume_filename("John_Smith", 3), "John_Smith_resume_3.pdf");
    }

    #[test]
    fn test_open_creates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let store = ResumeStore::open(root.path().join("resumes")).unwrap();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn test_existing_rejects_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let err = ResumeStore::existing(root.path().join("nope")).unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[test]
    fn test_list_resumes_only_returns_sorted_pdfs() {
        let root = tempfile::tempdir().unwrap();
        for name in ["b_resume.pdf", "a_resume.PDF", "notes.txt"] {
            std::fs::write(root.path().join(name), b"%PDF-1.4").unwrap();
        }
        let store = ResumeStore::existing(root.path()).unwrap();
        let names: Vec<String> = store
            .list_resumes()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_resume.PDF", "b_resume.pdf"]);
    }
}
