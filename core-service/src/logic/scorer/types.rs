//! Remote scorer wire types and errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::transaction::Transaction;

/// Features sent to the remote model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRequest {
    pub amount: f64,
    /// Unix seconds
    pub timestamp: i64,
    pub merchant: String,
    pub location: String,
}

impl From<&Transaction> for ScoreRequest {
    fn from(tx: &Transaction) -> Self {
        Self {
            amount: tx.amount,
            timestamp: tx.timestamp.timestamp(),
            merchant: tx.merchant.clone(),
            location: tx.location.clone(),
        }
    }
}

/// Prediction returned by the remote model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoreResponse {
    pub score: i64,
    /// Informational only; the engine derives its own decision
    #[serde(default)]
    pub decision: String,
    #[serde(default)]
    pub factors: Vec<String>,
    pub model_version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScorerHealth {
    pub status: String,
    #[serde(default)]
    pub models_loaded: bool,
}

/// Remote scorer errors. All of them route the engine to the fallback path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScorerError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server error: {0}")]
    Server(u16),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("timed out after {0} ms")]
    Timeout(u64),
    #[error("circuit breaker open")]
    CircuitOpen,
    #[error("remote scoring disabled")]
    Disabled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_tolerates_missing_factors() {
        let json = r#"{"score": 12, "decision": "ALLOW", "model_version": "v1.0.2-hybrid"}"#;
        let resp: ScoreResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.score, 12);
        assert!(resp.factors.is_empty());
    }

    #[test]
    fn test_request_from_transaction() {
        let tx = Transaction::new("BANK_A", "USER_1", 120.0)
            .with_merchant("Amazon")
            .with_location("Berlin");
        let req = ScoreRequest::from(&tx);

        assert_eq!(req.merchant, "Amazon");
        assert_eq!(req.timestamp, tx.timestamp.timestamp());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["location"], "Berlin");
    }
}
