use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::acquisition::{AcquisitionOrchestrator, HttpDownloader, ResumeStore};
use crate::classify::is_referral_request;
use crate::config::Config;
use crate::extraction::{ExtractionNormalizer, PdfTextReader};
use crate::llm_client::{self, LlmClient};
use crate::models::conversation::ConversationRecord;
use crate::pipeline::{self, input, Pipeline};
use crate::routes::build_router;
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "refdesk",
    about = "Turn referral requests from messaging exports into a candidate report",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify, acquire résumés, extract and write the report (default command)
    Run(PathArgs),
    /// Classify and acquire résumés only; saves a referral snapshot
    Scan(PathArgs),
    /// Extract from every résumé already in the store and write the report
    Analyze(PathArgs),
    /// Start the HTTP service
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct PathArgs {
    /// Conversation records file (otherwise the newest export in the messages directory)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Directory searched for message exports
    #[arg(long)]
    messages_dir: Option<PathBuf>,
    /// Résumé store directory
    #[arg(long)]
    resumes_dir: Option<PathBuf>,
    /// Report output path
    #[arg(long)]
    report: Option<PathBuf>,
}

impl PathArgs {
    /// Folds command-line overrides into the loaded configuration.
    fn apply(self, mut config: Config) -> (Config, Option<PathBuf>) {
        if let Some(dir) = self.messages_dir {
            config.messages_dir = dir;
        }
        if let Some(dir) = self.resumes_dir {
            config.resumes_dir = dir;
        }
        if let Some(path) = self.report {
            config.report_path = path;
        }
        (config, self.input)
    }
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

pub async fn run(config: Config) -> Result<()> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Run(PathArgs::default()));

    match command {
        Command::Run(args) => {
            let (config, input) = args.apply(config);
            run_pipeline(&config, input).await
        }
        Command::Scan(args) => {
            let (config, input) = args.apply(config);
            run_scan(&config, input).await
        }
        Command::Analyze(args) => {
            let (config, input) = args.apply(config);
            run_analyze(&config, input).await
        }
        Command::Serve(args) => serve(config, args).await,
    }
}

/// Builds the one extraction client for the process.
fn build_normalizer(config: &Config) -> Result<Arc<ExtractionNormalizer>> {
    let llm = LlmClient::new(config.require_api_key()?.to_string())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    Ok(Arc::new(ExtractionNormalizer::new(
        Arc::new(llm),
        config.extraction_delay,
        config.max_resume_chars,
    )))
}

fn load(config: &Config, input: Option<PathBuf>) -> Result<Vec<ConversationRecord>> {
    let path = input::resolve_input(input.as_deref(), &config.messages_dir)?;
    Ok(input::load_records(&path)?)
}

async fn run_pipeline(config: &Config, input: Option<PathBuf>) -> Result<()> {
    let records = load(config, input)?;
    let normalizer = build_normalizer(config)?;
    let store = ResumeStore::open(&config.resumes_dir)?;
    let downloader = HttpDownloader::new().context("failed to build HTTP client")?;
    let orchestrator = AcquisitionOrchestrator::new(&downloader, &store)
        .with_attachment_auth(config.attachment_cookie.clone());

    let (summary, report) = Pipeline::new(&normalizer, &PdfTextReader, &store)
        .run(&orchestrator, &records)
        .await;
    summary.log();
    report.write_csv(&config.report_path)?;
    Ok(())
}

async fn run_scan(config: &Config, input: Option<PathBuf>) -> Result<()> {
    let records = load(config, input)?;
    let store = ResumeStore::open(&config.resumes_dir)?;
    let downloader = HttpDownloader::new().context("failed to build HTTP client")?;
    let orchestrator = AcquisitionOrchestrator::new(&downloader, &store)
        .with_attachment_auth(config.attachment_cookie.clone());

    let summary = pipeline::scan(&orchestrator, &records).await;
    let referrals: Vec<_> = records
        .iter()
        .filter(|r| is_referral_request(&r.full_text()))
        .collect();
    input::write_snapshot(&config.messages_dir, &referrals, chrono::Local::now())?;
    summary.log();
    Ok(())
}

async fn run_analyze(config: &Config, input: Option<PathBuf>) -> Result<()> {
    let records = load(config, input)?;
    let normalizer = build_normalizer(config)?;
    let store = ResumeStore::existing(&config.resumes_dir)?;

    let report = Pipeline::new(&normalizer, &PdfTextReader, &store)
        .analyze(&records)
        .await?;
    report.write_csv(&config.report_path)?;
    Ok(())
}

async fn serve(config: Config, args: ServeArgs) -> Result<()> {
    let state = AppState {
        normalizer: build_normalizer(&config)?,
    };
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
