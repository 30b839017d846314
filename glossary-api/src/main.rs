//! glossary-api - Term Application Review service
//!
//! Runs the HTTP API for the collaborative glossary: submission intake,
//! crowd voting, linguist verification, and administrator approval.

use anyhow::Result;
use clap::Parser;
use glossary_common::config::{prepare_root_folder, resolve_root_folder};
use glossary_common::db::{
    init_database, read_setting_i64, DEFAULT_CROWD_VOTE_THRESHOLD, DEFAULT_HTTP_PORT,
    DEFAULT_REVIEW_MIN_LENGTH,
};
use glossary_common::events::EventBus;
use glossary_api::{build_router, AppState};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "glossary-api", about = "Collaborative glossary review service")]
struct Args {
    /// Root folder holding the database (overrides env and config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// HTTP port (overrides the stored setting)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting glossary-api v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), "GLOSSARY_ROOT")?;
    let db_path = prepare_root_folder(&root_folder)?;
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    let vote_threshold =
        read_setting_i64(&pool, "crowd_vote_threshold", DEFAULT_CROWD_VOTE_THRESHOLD).await?;
    let review_min_length =
        read_setting_i64(&pool, "review_min_length", DEFAULT_REVIEW_MIN_LENGTH).await?;
    let port = match args.port {
        Some(port) => port,
        None => read_setting_i64(&pool, "http_port", DEFAULT_HTTP_PORT).await? as u16,
    };

    info!(
        vote_threshold,
        review_min_length, "Loaded workflow settings"
    );

    let state = AppState::new(pool, EventBus::default(), vote_threshold, review_min_length as usize);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("glossary-api listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
