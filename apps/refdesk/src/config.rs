use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables (and `.env`).
///
/// `anthropic_api_key` is optional here; commands that call the extraction
/// service check for it via `require_api_key`.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub resumes_dir: PathBuf,
    pub report_path: PathBuf,
    pub messages_dir: PathBuf,
    pub extraction_delay: Duration,
    pub max_resume_chars: usize,
    pub attachment_cookie: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            resumes_dir: PathBuf::from(env_or("RESUMES_DIR", "resumes")),
            report_path: PathBuf::from(env_or("REPORT_PATH", "referral_report.csv")),
            messages_dir: PathBuf::from(env_or("MESSAGES_DIR", ".")),
            extraction_delay: Duration::from_millis(
                env_or("EXTRACTION_DELAY_MS", "1000")
                    .parse::<u64>()
                    .context("EXTRACTION_DELAY_MS must be a whole number of milliseconds")?,
            ),
            max_resume_chars: env_or("MAX_RESUME_CHARS", "10000")
                .parse::<usize>()
                .context("MAX_RESUME_CHARS must be a positive integer")?,
            attachment_cookie: optional_env("ATTACHMENT_COOKIE"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.anthropic_api_key
            .as_deref()
            .context("Required environment variable 'ANTHROPIC_API_KEY' is not set")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
