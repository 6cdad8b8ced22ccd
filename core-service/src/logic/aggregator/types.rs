//! Aggregator types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::engine::{Decision, RiskResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl ThreatLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "LOW",
            ThreatLevel::Medium => "MEDIUM",
            ThreatLevel::High => "HIGH",
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Network-wide statistics. Returned by value, so every snapshot is immutable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_transactions: u64,
    pub flagged_count: u64,
    pub blocked_count: u64,
    /// EMA over batch means
    pub average_risk_score: f64,
    pub threat_level: ThreatLevel,
}

/// One scored outcome as the aggregator sees it. No transaction data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub score: u8,
    pub decision: Decision,
}

impl From<&RiskResult> for BatchEntry {
    fn from(result: &RiskResult) -> Self {
        Self {
            score: result.score,
            decision: result.decision,
        }
    }
}

/// Per-batch trend point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub timestamp: DateTime<Utc>,
    pub batch_size: usize,
    pub batch_mean: f64,
    pub high_ratio: f64,
    pub threat_level: ThreatLevel,
}
