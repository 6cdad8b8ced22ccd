//! Scoring Rules & Thresholds
//!
//! Constants and configurable heuristics only. No scoring logic here.

use serde::{Deserialize, Serialize};

// ============================================================================
// DECISION THRESHOLDS
// ============================================================================

/// At or above this score = BLOCK
pub const BLOCK_THRESHOLD: u8 = 80;

/// At or above this score (and below BLOCK) = FLAG
pub const FLAG_THRESHOLD: u8 = 50;

/// Maximum risk score
pub const MAX_SCORE: u32 = 100;

/// Seed applied when another node has blocked the user
pub const FEDERATED_PENALTY: u32 = 100;

// ============================================================================
// REASON CODES
// ============================================================================

pub mod reasons {
    pub const FEDERATED_BLACKLIST_MATCH: &str = "FEDERATED_BLACKLIST_MATCH";
    pub const VELOCITY_SPIKE_FALLBACK: &str = "VELOCITY_SPIKE_FALLBACK";
    pub const HIGH_VALUE_FALLBACK: &str = "HIGH_VALUE_FALLBACK";
    pub const IMPOSSIBLE_TRAVEL_FALLBACK: &str = "IMPOSSIBLE_TRAVEL_FALLBACK";
    pub const ANOMALY_FALLBACK: &str = "ANOMALY_FALLBACK";
    pub const UNRECOGNIZED_DEVICE_FALLBACK: &str = "UNRECOGNIZED_DEVICE_FALLBACK";
    pub const CROSS_BORDER_FALLBACK: &str = "CROSS_BORDER_FALLBACK";
    /// Remote model scored above zero without naming a factor
    pub const MODEL_RISK_SCORE: &str = "MODEL_RISK_SCORE";
}

// ============================================================================
// FALLBACK HEURISTICS
// ============================================================================

/// Probability-gated rule, only evaluated when a noise source is injected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseRule {
    pub probability: f64,
    pub penalty: u32,
}

/// Heuristics used when the remote scorer is unavailable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicRules {
    /// More than this many transactions in the window = velocity spike
    pub velocity_max_in_window: usize,
    pub velocity_penalty: u32,
    /// Amounts strictly above this are high value
    pub high_value_threshold: f64,
    pub high_value_penalty: u32,
    /// Location change faster than this (seconds) is impossible travel
    pub impossible_travel_secs: i64,
    pub impossible_travel_penalty: u32,
    pub anomaly: NoiseRule,
    pub unrecognized_device: NoiseRule,
    pub cross_border: NoiseRule,
}

impl Default for HeuristicRules {
    fn default() -> Self {
        Self {
            velocity_max_in_window: 5,
            velocity_penalty: 40,
            high_value_threshold: 5000.0,
            high_value_penalty: 30,
            impossible_travel_secs: 10,
            impossible_travel_penalty: 50,
            anomaly: NoiseRule { probability: 0.05, penalty: 50 },
            unrecognized_device: NoiseRule { probability: 0.05, penalty: 30 },
            cross_border: NoiseRule { probability: 0.03, penalty: 45 },
        }
    }
}
