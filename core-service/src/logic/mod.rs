//! Logic Module - Business Logic & Engines
//!
//! ## Architecture
//! - `transaction` - input record and validation
//! - `profile/` - per-user behavioral windows
//! - `reputation/` - federated block signals with TTL
//! - `scorer/` - remote ML scorer client and circuit breaker
//! - `engine/` - risk scoring (remote + fallback heuristics)
//! - `aggregator/` - global stats and threat level
//! - `events` - observer broadcast channel
//! - `pipeline` - per-tick orchestration

// Shared infrastructure
pub mod clock;
pub mod config;
pub mod events;
pub mod transaction;

// Stores
pub mod profile;
pub mod reputation;

// Scoring
pub mod scorer;
pub mod engine;
pub mod aggregator;
pub mod pipeline;
