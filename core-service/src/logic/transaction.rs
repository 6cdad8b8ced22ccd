//! Transaction - the immutable record every node feeds into the engine
//!
//! Missing optional fields deserialize to `"Unknown"`; structural problems
//! (empty ids, non-positive amount) are rejected by `validate` before the
//! transaction reaches the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::UNKNOWN_FIELD;

fn unknown() -> String {
    UNKNOWN_FIELD.to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub source_node_id: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "unknown")]
    pub merchant: String,
    #[serde(default = "unknown")]
    pub location: String,
    #[serde(default = "unknown")]
    pub device_id: String,
    pub user_id: String,
}

/// Rejection reasons for malformed transactions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransactionError {
    #[error("transaction id is empty")]
    MissingId,
    #[error("transaction {0} has no source node")]
    MissingNode(String),
    #[error("transaction {0} has no user id")]
    MissingUser(String),
    #[error("transaction {id} has invalid amount {amount}")]
    InvalidAmount { id: String, amount: f64 },
}

impl Transaction {
    /// Build a transaction stamped with a fresh id and the current time.
    /// Optional fields start as `"Unknown"`.
    pub fn new(source_node_id: &str, user_id: &str, amount: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_node_id: source_node_id.to_string(),
            timestamp: Utc::now(),
            amount,
            currency: default_currency(),
            merchant: unknown(),
            location: unknown(),
            device_id: unknown(),
            user_id: user_id.to_string(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_merchant(mut self, merchant: &str) -> Self {
        self.merchant = merchant.to_string();
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.to_string();
        self
    }

    pub fn with_device(mut self, device_id: &str) -> Self {
        self.device_id = device_id.to_string();
        self
    }

    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_string();
        self
    }

    /// Reject transactions that must never enter the engine
    pub fn validate(&self) -> Result<(), TransactionError> {
        if self.id.trim().is_empty() {
            return Err(TransactionError::MissingId);
        }
        if self.source_node_id.trim().is_empty() {
            return Err(TransactionError::MissingNode(self.id.clone()));
        }
        if self.user_id.trim().is_empty() {
            return Err(TransactionError::MissingUser(self.id.clone()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(TransactionError::InvalidAmount {
                id: self.id.clone(),
                amount: self.amount,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optional_fields_default_to_unknown() {
        let json = r#"{
            "id": "tx-1",
            "sourceNodeId": "BANK_A",
            "amount": 42.5,
            "userId": "USER_7"
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.merchant, "Unknown");
        assert_eq!(tx.location, "Unknown");
        assert_eq!(tx.device_id, "Unknown");
        assert_eq!(tx.currency, "USD");
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_builder_fills_optional_fields() {
        let tx = Transaction::new("BANK_A", "USER_1", 120.0)
            .with_merchant("Steam")
            .with_location("Lisbon")
            .with_device("dev-42")
            .with_currency("EUR");

        assert_eq!(tx.merchant, "Steam");
        assert_eq!(tx.location, "Lisbon");
        assert_eq!(tx.device_id, "dev-42");
        assert_eq!(tx.currency, "EUR");

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["deviceId"], "dev-42");
        assert_eq!(json["currency"], "EUR");
    }

    #[test]
    fn test_validate_rejects_bad_amounts() {
        let tx = Transaction::new("BANK_A", "USER_1", 0.0);
        assert!(matches!(tx.validate(), Err(TransactionError::InvalidAmount { .. })));

        let tx = Transaction::new("BANK_A", "USER_1", f64::NAN);
        assert!(tx.validate().is_err());

        let tx = Transaction::new("BANK_A", "USER_1", -5.0);
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_ids() {
        let tx = Transaction::new("", "USER_1", 10.0);
        assert!(matches!(tx.validate(), Err(TransactionError::MissingNode(_))));

        let tx = Transaction::new("BANK_A", "  ", 10.0);
        assert!(matches!(tx.validate(), Err(TransactionError::MissingUser(_))));
    }
}
