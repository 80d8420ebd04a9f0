pub mod health;
pub mod identity;
pub mod referrals;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/referrals/classify",
            post(referrals::handle_classify),
        )
        .route("/api/v1/referrals/extract", post(referrals::handle_extract))
        .route("/api/v1/identity/resolve", post(identity::handle_resolve))
        .with_state(state)
}
