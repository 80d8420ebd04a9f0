// Résumé acquisition: source eligibility, store naming, and the download
// collaborator. The orchestrator is the only caller of `Downloader`.

pub mod downloader;
pub mod orchestrator;
pub mod store;

pub use downloader::HttpDownloader;
pub use orchestrator::AcquisitionOrchestrator;
pub use store::ResumeStore;
