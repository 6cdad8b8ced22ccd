//! Engine Types
//!
//! Core result types. No logic beyond the decision mapping.

use serde::{Deserialize, Serialize};

use super::rules::{BLOCK_THRESHOLD, FLAG_THRESHOLD};
use crate::logic::transaction::Transaction;

// ============================================================================
// DECISION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Allow,
    Flag,
    Block,
}

impl Decision {
    /// score >= 80 → BLOCK, 50..80 → FLAG, else ALLOW
    pub fn from_score(score: u8) -> Self {
        if score >= BLOCK_THRESHOLD {
            Decision::Block
        } else if score >= FLAG_THRESHOLD {
            Decision::Flag
        } else {
            Decision::Allow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Flag => "FLAG",
            Decision::Block => "BLOCK",
        }
    }

    pub fn is_high_risk(&self) -> bool {
        matches!(self, Decision::Flag | Decision::Block)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RISK RESULT
// ============================================================================

/// Diagnostics attached by the fallback path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation_pct: Option<f64>,
    /// Why the remote scorer was not used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_cause: Option<String>,
}

/// Verdict for one transaction. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResult {
    /// 0..=100
    pub score: u8,
    pub decision: Decision,
    /// Ordered, non-empty iff score > 0
    pub reasons: Vec<String>,
    /// Remote model id or `heuristic-fallback`
    pub scorer_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RiskMetadata>,
}

impl RiskResult {
    pub fn primary_reason(&self) -> Option<&str> {
        self.reasons.first().map(String::as_str)
    }

    pub fn has_reason(&self, code: &str) -> bool {
        self.reasons.iter().any(|r| r == code)
    }
}

/// Observer payload emitted after each scored transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTransaction {
    pub transaction: Transaction,
    pub result: RiskResult,
}
