mod config;
mod errors;
mod llm_client;
mod models;
mod pipeline;
mod reports;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::pipeline::formalizer::ReportPipeline;
use crate::reports::store::ReportStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting formalizer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.gemini_api_key.clone(),
        &config.gemini_base_url,
        config.llm_max_attempts,
    )?;
    if !llm.is_configured() {
        warn!("GEMINI_API_KEY is not set; formalization requests will fail until it is");
    }
    info!(
        "LLM client initialized (model: {}, max attempts: {})",
        config.gemini_model, config.llm_max_attempts
    );

    let pipeline = ReportPipeline::new(Arc::new(llm), config.gemini_model.clone());

    // Initialize report store
    let store = Arc::new(ReportStore::new(config.reports_file.clone()));
    info!("Report store at {}", store.path().display());

    let state = AppState { pipeline, store };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
