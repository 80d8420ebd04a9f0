use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::identity::{resolve, MatchTier};

#[derive(Deserialize)]
pub struct ResolveRequest {
    pub query: String,
    pub candidates: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub matched: Option<String>,
    pub tier: Option<MatchTier>,
}

/// POST /api/v1/identity/resolve
pub async fn handle_resolve(
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, AppError> {
    if req.query.trim().is_empty() {
        return Err(AppError::Validation("query must not be empty".to_string()));
    }
    let candidates: Vec<&str> = req.candidates.iter().map(String::as_str).collect();
    let resolution = resolve(&req.query, &candidates);
    Ok(Json(ResolveResponse {
        matched: resolution.map(|r| req.candidates[r.index].clone()),
        tier: resolution.map(|r| r.tier),
    }))
}
