//! Transaction request models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use sentinel_core::constants::UNKNOWN_FIELD;
use sentinel_core::Transaction;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTransaction {
    /// Generated when absent
    #[validate(length(min = 1, max = 128))]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub source_node_id: String,
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
    pub timestamp: Option<DateTime<Utc>>,
    #[validate(length(max = 8))]
    pub currency: Option<String>,
    pub merchant: Option<String>,
    pub location: Option<String>,
    pub device_id: Option<String>,
}

impl SubmitTransaction {
    pub fn into_transaction(self) -> Transaction {
        let or_unknown = |v: Option<String>| v.unwrap_or_else(|| UNKNOWN_FIELD.to_string());

        Transaction {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            source_node_id: self.source_node_id,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            amount: self.amount,
            currency: self.currency.unwrap_or_else(|| "USD".to_string()),
            merchant: or_unknown(self.merchant),
            location: or_unknown(self.location),
            device_id: or_unknown(self.device_id),
            user_id: self.user_id,
        }
    }
}

/// One tick of transactions from any number of nodes.
///
/// Items are not validated here: malformed ones come back in `rejected`.
/// At most 1000 transactions per tick.
#[derive(Debug, Deserialize, Validate)]
pub struct TickRequest {
    #[validate(length(max = 1000))]
    pub transactions: Vec<SubmitTransaction>,
}
