mod applications;
mod config;
mod db;
mod errors;
mod extract;
mod llm_client;
mod models;
mod pipeline;
mod resumes;
mod routes;
mod screening;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::pipeline::ScreeningCoordinator;
use crate::routes::build_router;
use crate::screening::{default_criteria, GroqEvaluator};
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Shortlist API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and apply migrations
    let pool = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(pool));

    // Initialize LLM client
    if config.groq_api_key.is_empty() {
        warn!("GROQ_API_KEY is not set; screening runs will park applications in waitResult");
    }
    let llm = LlmClient::new(config.groq_api_key.clone(), config.screening_model.clone());
    let evaluator = Arc::new(GroqEvaluator::new(llm));
    info!("LLM client initialized (model: {})", evaluator.model());

    // Screening coordinator owns the background evaluation tasks
    let coordinator = ScreeningCoordinator::new(
        store.clone(),
        evaluator,
        config.screening_model.clone(),
        default_criteria(),
    );

    // Build app state
    let state = AppState { store, coordinator };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
