//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use sentinel_core::logic::scorer::CircuitState;
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    core_version: &'static str,
    timestamp: i64,
    scorer: ScorerStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorerStatus {
    url: String,
    remote_enabled: bool,
    /// None when remote scoring is switched off
    reachable: Option<bool>,
    models_loaded: bool,
    breaker: CircuitState,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let pipeline = &state.pipeline;
    let remote_enabled = pipeline.switches().is_remote_enabled();

    let (reachable, models_loaded) = if remote_enabled {
        match pipeline.scorer_health().await {
            Ok(health) => (Some(true), health.models_loaded),
            Err(e) => {
                tracing::warn!("Scorer health probe failed: {}", e);
                (Some(false), false)
            }
        }
    } else {
        (None, false)
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        core_version: sentinel_core::constants::APP_VERSION,
        timestamp: chrono::Utc::now().timestamp(),
        scorer: ScorerStatus {
            url: state.config.scorer_url.clone(),
            remote_enabled,
            reachable,
            models_loaded,
            breaker: pipeline.engine().breaker_state(),
        },
    })
}
