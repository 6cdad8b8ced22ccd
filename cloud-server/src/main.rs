//! Sentinel Server
//!
//! HTTP ingestion and query surface for the federated risk core.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SENTINEL SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌─────────────────────────────────────────┐ │
//! │  │  API      │  │  Pipeline (sentinel-core)               │ │
//! │  │  (Axum)   │──▶  engine ─ reputation ─ profiles ─ stats │ │
//! │  └───────────┘  └───────────────────┬─────────────────────┘ │
//! │                                     ▼                       │
//! │                          ┌──────────────────┐               │
//! │                          │  Remote scorer   │               │
//! │                          │  (POST /predict) │               │
//! │                          └──────────────────┘               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod handlers;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentinel_core::{HttpScorer, Pipeline, ScorerConfig, SystemClock};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sentinel_server=debug,sentinel_core=info,tower_http=debug".into());
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Sentinel Server starting ({})...", config.environment);
    tracing::info!("Remote scorer: {}", config.scorer_url);

    let scorer = HttpScorer::new(ScorerConfig {
        base_url: config.scorer_url.clone(),
        timeout: config.engine.scorer_timeout,
    })
    .context("Failed to build scorer client")?;

    let state = AppState::new(scorer, config.clone());
    let _sweeper = state.pipeline.spawn_sweeper(config.sweep_interval);
    tracing::info!("Sweeping expired reputation every {:?}", config.sweep_interval);
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline<HttpScorer>>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(scorer: HttpScorer, config: config::Config) -> Self {
        let pipeline = Pipeline::new(scorer, config.engine.clone(), Arc::new(SystemClock));

        Self {
            pipeline: Arc::new(pipeline),
            config,
        }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Ingestion
        .route("/api/v1/transactions", post(handlers::transactions::submit))
        .route("/api/v1/ticks", post(handlers::transactions::tick))

        // Global state
        .route("/api/v1/stats", get(handlers::stats::get))
        .route("/api/v1/stats/history", get(handlers::stats::history))
        .route("/api/v1/reputation/:user_id", get(handlers::reputation::check))

        // Nodes
        .route("/api/v1/nodes", get(handlers::nodes::list))
        .route("/api/v1/nodes/:node_id/history", get(handlers::nodes::history))

        // Controls
        .route(
            "/api/v1/controls/scoring",
            get(handlers::controls::get_scoring).put(handlers::controls::update_scoring),
        );

    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
