//! Transaction ingestion handlers

use axum::{extract::State, Json};
use validator::Validate;

use sentinel_core::{ScoredTransaction, TickReport};
use crate::{AppState, AppResult};
use crate::models::{SubmitTransaction, TickRequest};

/// Score a single transaction
pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitTransaction>,
) -> AppResult<Json<ScoredTransaction>> {
    req.validate()?;

    let scored = state.pipeline.score_one(req.into_transaction()).await?;
    tracing::debug!(
        "Scored {} for {}: {}",
        scored.transaction.id,
        scored.transaction.source_node_id,
        scored.result.decision
    );

    Ok(Json(scored))
}

/// Score one tick across nodes and update global stats
pub async fn tick(
    State(state): State<AppState>,
    Json(req): Json<TickRequest>,
) -> AppResult<Json<TickReport>> {
    req.validate()?;

    let transactions = req
        .transactions
        .into_iter()
        .map(|t| t.into_transaction())
        .collect();

    Ok(Json(state.pipeline.process_tick(transactions).await))
}
