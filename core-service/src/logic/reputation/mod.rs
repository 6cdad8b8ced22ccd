//! Reputation Module - federated block signals
//!
//! Best-effort, eventually-consistent blocklist shared by all nodes. Not a
//! consensus protocol: records are last-writer-wins and expire after a TTL.

pub mod cache;
pub mod types;

pub use cache::{anonymize, ReputationCache};
pub use types::{ReputationRecord, ReputationStats, ReputationStatus};
