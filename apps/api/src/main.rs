mod backend;
mod cache;
mod config;
mod errors;
mod matching;
mod models;
mod routes;
mod scoring;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend::{BackendClient, ResumeTextResolver};
use crate::cache::{CachedResolver, MemoryTextCache, RedisTextCache, TextCache};
use crate::config::Config;
use crate::matching::orchestrator::{MatchOrchestrator, OrchestratorSettings};
use crate::routes::build_router;
use crate::scoring::HttpMatchScorer;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Match API v{}", env!("CARGO_PKG_VERSION"));

    // Backend client (retrieval, resume text, persistence)
    let backend = Arc::new(BackendClient::new(
        config.backend_url.clone(),
        config.call_timeout,
    )?);
    info!("Backend client initialized ({})", config.backend_url);

    // Scoring client
    let scorer = Arc::new(HttpMatchScorer::new(
        config.matcher_url.clone(),
        config.call_timeout,
    )?);
    info!("Scoring client initialized ({})", config.matcher_url);

    let resolver = build_resolver(&config, backend.clone()).await;

    let orchestrator = MatchOrchestrator::new(
        backend.clone(),
        resolver,
        scorer.clone(),
        backend,
        OrchestratorSettings {
            workers: config.match_workers,
            call_timeout: config.call_timeout,
        },
    );
    info!(
        "Match orchestrator: {} workers, {}s call timeout",
        config.match_workers,
        config.call_timeout.as_secs()
    );

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        scorer,
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

/// Wraps the backend resolver in a TTL cache: Redis when configured and
/// reachable, otherwise process memory. A zero TTL disables caching.
async fn build_resolver(
    config: &Config,
    backend: Arc<BackendClient>,
) -> Arc<dyn ResumeTextResolver> {
    if config.resume_cache_ttl.is_zero() {
        info!("Resume text cache disabled");
        return backend;
    }

    let cache: Arc<dyn TextCache> = match &config.redis_url {
        Some(url) => match RedisTextCache::connect(url).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                warn!("Redis unavailable ({e}); falling back to in-memory resume text cache");
                Arc::new(MemoryTextCache::new())
            }
        },
        None => Arc::new(MemoryTextCache::new()),
    };
    info!(
        "Resume text cache enabled (ttl {}s)",
        config.resume_cache_ttl.as_secs()
    );

    Arc::new(CachedResolver::new(backend, cache, config.resume_cache_ttl))
}
