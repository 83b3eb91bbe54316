mod config;
mod cv;
mod db;
mod errors;
mod forms;
mod extraction;
mod llm_client;
mod models;
mod profile;
mod routes;
mod state;
mod storage;
mod structuring;
mod thumbnail;

use anyhow::Result;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{extractor_from_env, Config, ToolConfig};
use crate::db::create_pool;
use crate::extraction::render::PdfiumRenderer;
use crate::extraction::{standard_extractor, LayeredExtractor};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{build_s3_client, ObjectStore};
use crate::structuring::LlmResumeStructurer;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if let [_, command, path] = args.as_slice() {
        if command == "extract" {
            return extract_once(Path::new(path));
        }
    }

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting intake v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let store = ObjectStore::new(s3, config.s3_bucket.clone());
    let photos = store.with_bucket(config.s3_photos_bucket.clone());
    info!(
        "S3 client initialized (bucket: {}, photos: {})",
        config.s3_bucket, config.s3_photos_bucket
    );

    // Initialize LLM client and structurer
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let structurer = Arc::new(LlmResumeStructurer::new(llm));

    let extractor = standard_extractor(config.extractor, &config.tools);
    log_extractor(&extractor);

    let state = AppState {
        db,
        store,
        photos,
        structurer,
        extractor: Arc::new(extractor),
        renderer: PdfiumRenderer::new(config.tools.pdfium_library_path.clone()),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn log_extractor(extractor: &LayeredExtractor) {
    let config = extractor.config();
    info!(
        "Extractor ready: {} (min_length={}, ocr_page_limit={}, ocr_zoom={})",
        extractor.strategy_names().join(" -> "),
        config.min_length,
        config.ocr_page_limit,
        config.ocr_zoom
    );
}

/// `intake extract <file.pdf>`: print the extracted text and exit. Logs go to stderr.
fn extract_once(path: &Path) -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("intake=warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let extractor = standard_extractor(extractor_from_env()?, &ToolConfig::from_env());
    log_extractor(&extractor);
    println!("{}", extractor.extract_text_from_path(path));
    Ok(())
}
