//! Locating and loading conversation records, and the referral snapshot file.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tracing::info;

use crate::errors::AppError;
use crate::models::conversation::ConversationRecord;

/// Scraper export files are named `…unread_messages_<timestamp>.json`.
const EXPORT_MARKER: &str = "unread_messages_";

/// Picks the records file: the explicit path when given, otherwise the newest
/// scraper export in `messages_dir`.
pub fn resolve_input(explicit: Option<&Path>, messages_dir: &Path) -> Result<PathBuf, AppError> {
    match explicit {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(AppError::NoInput(format!(
            "{} does not exist",
            path.display()
        ))),
        None => discover_input(messages_dir),
    }
}

/// Newest `*unread_messages_*.json`, else the newest JSON file whose name
/// mentions "linkedin" or "message".
pub fn discover_input(messages_dir: &Path) -> Result<PathBuf, AppError> {
    let entries = std::fs::read_dir(messages_dir).map_err(|e| {
        AppError::NoInput(format!("cannot read {}: {e}", messages_dir.display()))
    })?;

    let mut exports = Vec::new();
    let mut fallbacks = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let name = name.to_lowercase();
        if !name.ends_with(".json") || !path.is_file() {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if name.contains(EXPORT_MARKER) {
            exports.push((modified, path));
        } else if name.contains("linkedin") || name.contains("message") {
            fallbacks.push((modified, path));
        }
    }

    newest(exports)
        .or_else(|| newest(fallbacks))
        .ok_or_else(|| {
            AppError::NoInput(format!(
                "no message export found in {}",
                messages_dir.display()
            ))
        })
}

fn newest(mut files: Vec<(SystemTime, PathBuf)>) -> Option<PathBuf> {
    files.sort();
    files.pop().map(|(_, path)| path)
}

/// Reads a JSON array of records. An empty array is a whole-run failure.
pub fn load_records(path: &Path) -> Result<Vec<ConversationRecord>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let records: Vec<ConversationRecord> = serde_json::from_str(&raw)?;
    if records.is_empty() {
        return Err(AppError::NoInput(format!(
            "{} contains no conversation records",
            path.display()
        )));
    }
    info!("Loaded {} conversations from {}", records.len(), path.display());
    Ok(records)
}

pub fn snapshot_filename(at: DateTime<Local>) -> String {
    format!("referral_requests_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Writes the referral records to `referral_requests_<timestamp>.json` in
/// `dir` so a later `analyze` can reuse them.
pub fn write_snapshot(
    dir: &Path,
    records: &[&ConversationRecord],
    at: DateTime<Local>,
) -> Result<PathBuf, AppError> {
    let path = dir.join(snapshot_filename(at));
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(&path, json)?;
    info!("Saved {} referral requests to {}", records.len(), path.display());
    Ok(path)
}
