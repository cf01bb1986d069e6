mod config;
mod context;
mod db;
mod errors;
mod interview;
mod llm_client;
mod models;
mod profile;
mod routes;
mod state;
mod storage;

use anyhow::{Context as _, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StorageBackend};
use crate::db::{create_pool, ensure_schema};
use crate::interview::coach::GeminiCoach;
use crate::interview::registry::{SessionRegistry, SESSION_IDLE_TIMEOUT, SWEEP_INTERVAL};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{KeyValueStore, MemoryStore, PgStore, ProgressStore, RedisStore};

/// Namespace for every key this service writes to Redis.
const REDIS_KEY_PREFIX: &str = "coach:";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview Coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize persistence
    let store = build_store(&config).await?;
    let progress = ProgressStore::new(store);

    // Initialize LLM client
    let llm = LlmClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_api_base.clone(),
    )?;
    if !llm.has_credential() {
        warn!("GEMINI_API_KEY is not set; question generation and evaluation will fail");
    }
    info!("LLM client initialized (model: {})", llm.model());

    // Initialize coach and session registry
    let coach = Arc::new(GeminiCoach::new(llm));
    let sessions = Arc::new(SessionRegistry::new(coach, progress.clone(), config.session));
    sessions.spawn_sweeper(SWEEP_INTERVAL, SESSION_IDLE_TIMEOUT);
    info!(
        "Sessions run {} questions each",
        config.session.question_cap
    );

    // Build app state
    let state = AppState {
        progress,
        sessions,
        config: config.clone(),
    };

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

/// Opens the configured key-value backend.
async fn build_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    match config.storage_backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; progress is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Redis => {
            let url = config.redis_url.as_deref().context("REDIS_URL is not set")?;
            let client = redis::Client::open(url)?;
            info!("Redis client initialized");
            Ok(Arc::new(RedisStore::new(client, REDIS_KEY_PREFIX)))
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is not set")?;
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
