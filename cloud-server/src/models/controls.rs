//! Operational control models

use serde::Deserialize;
use validator::Validate;

/// Partial update of the scoring kill-switches
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScoringControls {
    pub remote_enabled: Option<bool>,
    pub propagation_enabled: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReputationQuery {
    /// Node asking; its own blocks are not reported back
    #[validate(length(min = 1, max = 64))]
    pub node: String,
}
