//! Reputation Types
//!
//! Data structures only; lookup and expiry live in `cache.rs`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One shared block signal, keyed by the anonymized userId
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationRecord {
    pub reporting_node_id: String,
    pub recorded_at: DateTime<Utc>,
    pub reason: String,
}

/// Result of a reputation lookup as seen by the querying node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReputationStatus {
    /// Another node blocked this user within the TTL
    Untrusted {
        source: String,
        #[serde(rename = "originalTimestamp")]
        original_timestamp: DateTime<Utc>,
        reason: String,
    },
    /// No usable record (none, or the querying node's own report)
    Trusted,
    /// A record existed but had outlived the TTL and was purged
    Expired,
}

impl ReputationStatus {
    pub fn is_untrusted(&self) -> bool {
        matches!(self, ReputationStatus::Untrusted { .. })
    }

    /// Expired records are honored as trusted
    pub fn is_trusted(&self) -> bool {
        !self.is_untrusted()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationStats {
    pub total_records: usize,
    pub active_records: usize,
    pub stale_records: usize,
}
