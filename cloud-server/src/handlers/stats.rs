//! Global statistics handlers

use axum::{extract::State, Json};

use sentinel_core::{BatchSummary, GlobalStats};
use crate::AppState;

pub async fn get(State(state): State<AppState>) -> Json<GlobalStats> {
    Json(state.pipeline.stats())
}

/// Recent batch summaries, oldest first
pub async fn history(State(state): State<AppState>) -> Json<Vec<BatchSummary>> {
    Json(state.pipeline.stats_history())
}
