mod acquisition;
mod classify;
mod cli;
mod config;
mod errors;
mod extraction;
mod identity;
mod llm_client;
mod models;
mod pipeline;
mod report;
mod routes;
mod state;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; invalid numeric settings abort here
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting refdesk v{}", env!("CARGO_PKG_VERSION"));

    cli::run(config).await
}
