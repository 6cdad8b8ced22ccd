//! Node handlers

use axum::{extract::{Path, State}, Json};

use sentinel_core::ScoredTransaction;
use crate::{AppState, AppResult, AppError};

/// Configured node ids
pub async fn list(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.config.node_ids.clone())
}

/// Recent scored transactions for one node, newest last
pub async fn history(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> AppResult<Json<Vec<ScoredTransaction>>> {
    let history = state.pipeline.node_history(&node_id);
    if history.is_empty() && !state.config.is_known_node(&node_id) {
        return Err(AppError::NotFound(format!("Unknown node: {}", node_id)));
    }

    Ok(Json(history))
}
