use std::sync::Arc;

use crate::extraction::ExtractionNormalizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Wraps the one extraction client built in `main`.
    pub normalizer: Arc<ExtractionNormalizer>,
}
