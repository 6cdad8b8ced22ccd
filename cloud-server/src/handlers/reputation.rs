//! Reputation lookup handler

use axum::{extract::{Path, Query, State}, Json};
use validator::Validate;

use sentinel_core::ReputationStatus;
use crate::{AppState, AppResult};
use crate::models::ReputationQuery;

/// Reputation of a user as seen by the querying node
pub async fn check(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ReputationQuery>,
) -> AppResult<Json<ReputationStatus>> {
    query.validate()?;
    Ok(Json(state.pipeline.check_reputation(&user_id, &query.node)))
}
