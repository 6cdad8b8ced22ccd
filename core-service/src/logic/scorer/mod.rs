//! Scorer Module - the external scoring dependency
//!
//! - `types`: wire types and `ScorerError`
//! - `client`: `RemoteScorer` trait and the HTTP implementation
//! - `breaker`: optional stateful circuit breaker

pub mod breaker;
pub mod client;
pub mod types;

pub use breaker::{BreakerPermit, CircuitBreaker, CircuitState};
pub use client::{HttpScorer, RemoteScorer, ScorerConfig};
pub use types::{ScoreRequest, ScoreResponse, ScorerError, ScorerHealth};
