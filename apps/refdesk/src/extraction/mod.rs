// Extraction: résumé text in, normalized report fields out.
// All calls to the hosted model go through the `Extractor` trait.

pub mod collaborator;
pub mod job_id;
pub mod normalizer;
pub mod parse;
pub mod prompts;
pub mod reader;

pub use normalizer::ExtractionNormalizer;
pub use reader::{PdfTextReader, ResumeReader};

/// Marker appended when résumé text is clipped.
pub const TRUNCATION_MARKER: &str = "...";

/// Clips `text` to at most `max_chars` characters, appending the marker when
/// anything was removed.
pub fn truncate_resume_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}
