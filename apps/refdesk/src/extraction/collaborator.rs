//! Extraction collaborator contract.
//!
//! A request is (instructional text, input text); the response is free text
//! that should contain one JSON object. Parsing is the caller's job.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::llm_client::{LlmClient, LlmError};

#[async_trait]
pub trait Extractor: Send + Sync {
    async fn complete(&self, instructions: &str, input: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl Extractor for LlmClient {
    async fn complete(&self, instructions: &str, input: &str) -> Result<String, LlmError> {
        self.call_text(input, instructions).await
    }
}

/// Enforces a minimum gap between consecutive extraction calls.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_call: Mutex::new(None),
        }
    }

    /// Sleeps until `delay` has passed since the previous call, then marks a new one.
    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}
