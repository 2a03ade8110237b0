mod config;
mod db;
mod errors;
mod models;
mod routes;
mod screening;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::screening::store::PgMatchStore;
use crate::screening::vocabulary::SkillVocabulary;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screening API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Load the skill vocabulary (built-in unless SKILL_VOCABULARY_PATH is set)
    let vocabulary = match &config.skill_vocabulary_path {
        Some(path) => SkillVocabulary::load(path)
            .with_context(|| format!("Failed to load skill vocabulary from {}", path.display()))?,
        None => SkillVocabulary::builtin().context("Built-in skill vocabulary is invalid")?,
    };
    info!(
        "Skill vocabulary {} loaded ({} domains, {} skills)",
        vocabulary.version(),
        vocabulary.domain_names().count(),
        vocabulary.normalized_forms().count()
    );

    if config.fallback_on_empty_skills {
        tracing::warn!("FALLBACK_ON_EMPTY_SKILLS is enabled: CVs without detected skills get synthetic skill sets");
    }

    // Build app state
    let state = AppState {
        store: Arc::new(PgMatchStore::new(db)),
        vocabulary: Arc::new(vocabulary),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the dashboard host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
