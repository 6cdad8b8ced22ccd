//! Behavioral Profile Module
//!
//! Per-user sliding-window transaction history consumed by the heuristic
//! fallback scorer.
//!
//! - `types`: `BehavioralProfile`, `ProfileSnapshot`
//! - `store`: `ProfileStore` (locking, eviction)

pub mod store;
pub mod types;

pub use store::ProfileStore;
pub use types::{BehavioralProfile, ProfileSnapshot};
