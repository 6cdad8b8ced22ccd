//! Operational controls

use axum::{extract::State, Json};

use sentinel_core::SwitchState;
use crate::AppState;
use crate::models::UpdateScoringControls;

pub async fn get_scoring(State(state): State<AppState>) -> Json<SwitchState> {
    Json(state.pipeline.switches().snapshot())
}

/// Toggle remote scoring / block propagation at runtime
pub async fn update_scoring(
    State(state): State<AppState>,
    Json(req): Json<UpdateScoringControls>,
) -> Json<SwitchState> {
    let switches = state.pipeline.switches();

    if let Some(remote) = req.remote_enabled {
        switches.set_remote(remote);
        tracing::info!("Remote scoring {}", if remote { "enabled" } else { "disabled (forced fallback)" });
    }
    if let Some(propagation) = req.propagation_enabled {
        switches.set_propagation(propagation);
        tracing::info!("Block propagation {}", if propagation { "enabled" } else { "disabled" });
    }

    Json(switches.snapshot())
}
