//! Fallback Heuristics
//!
//! ONLY the rule evaluation used when the remote scorer is unavailable.
//! Input: Transaction, ProfileSnapshot, HeuristicRules, optional noise
//! Output: HeuristicOutcome (points before capping)

use super::noise::NoiseSource;
use super::rules::{reasons, HeuristicRules, NoiseRule};
use super::types::RiskMetadata;
use crate::constants::UNKNOWN_FIELD;
use crate::logic::profile::ProfileSnapshot;
use crate::logic::transaction::Transaction;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeuristicOutcome {
    /// Sum of fired penalties, uncapped
    pub points: u32,
    /// Fired rules in evaluation order
    pub reasons: Vec<String>,
    pub metadata: RiskMetadata,
}

impl HeuristicOutcome {
    fn fire(&mut self, penalty: u32, reason: &str) {
        self.points += penalty;
        self.reasons.push(reason.to_string());
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Evaluate every fallback rule against one transaction.
///
/// `snapshot` must come from the profile touch for this same transaction,
/// so `window_count` already includes it.
pub fn evaluate(
    tx: &Transaction,
    snapshot: &ProfileSnapshot,
    rules: &HeuristicRules,
    noise: Option<&mut dyn NoiseSource>,
) -> HeuristicOutcome {
    let mut outcome = HeuristicOutcome::default();

    // Velocity
    if snapshot.window_count > rules.velocity_max_in_window {
        outcome.fire(rules.velocity_penalty, reasons::VELOCITY_SPIKE_FALLBACK);
        outcome.metadata.velocity_count = Some(snapshot.window_count);
        outcome.metadata.deviation_pct = Some(snapshot.deviation_pct(tx.amount));
    }

    if is_impossible_travel(tx, snapshot, rules) {
        outcome.fire(rules.impossible_travel_penalty, reasons::IMPOSSIBLE_TRAVEL_FALLBACK);
    }

    // High value
    if tx.amount > rules.high_value_threshold {
        outcome.fire(rules.high_value_penalty, reasons::HIGH_VALUE_FALLBACK);
    }

    if let Some(noise) = noise {
        let noisy: [(&NoiseRule, &str); 3] = [
            (&rules.anomaly, reasons::ANOMALY_FALLBACK),
            (&rules.unrecognized_device, reasons::UNRECOGNIZED_DEVICE_FALLBACK),
            (&rules.cross_border, reasons::CROSS_BORDER_FALLBACK),
        ];
        for (rule, reason) in noisy {
            if noise.roll(rule.probability) {
                outcome.fire(rule.penalty, reason);
            }
        }
    }

    outcome
}

/// Location changed faster than anyone could travel
fn is_impossible_travel(tx: &Transaction, snapshot: &ProfileSnapshot, rules: &HeuristicRules) -> bool {
    let (Some(prev_location), Some(prev_seen)) =
        (snapshot.previous_location.as_deref(), snapshot.previous_seen_at)
    else {
        return false;
    };

    if prev_location == tx.location || prev_location == UNKNOWN_FIELD || tx.location == UNKNOWN_FIELD {
        return false;
    }

    let elapsed = (tx.timestamp - prev_seen).num_seconds().abs();
    elapsed < rules.impossible_travel_secs
}
