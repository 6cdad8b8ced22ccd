//! Engine Module - Risk Scoring
//!
//! Turns a transaction into a score, a decision and ordered reason codes.
//!
//! ## Structure
//! - `types`: `Decision`, `RiskResult`, `ScoredTransaction`
//! - `rules`: thresholds, reason codes, `HeuristicRules`
//! - `noise`: injectable randomness for the probability-gated rules
//! - `heuristics`: fallback rule evaluation
//! - `scoring`: `RiskEngine`, the orchestration
//!
//! ## Usage
//! ```ignore
//! let engine = RiskEngine::new(scorer, reputation, profiles, EngineConfig::default());
//! let result = engine.score(&tx).await;
//! if result.decision == Decision::Block { /* ... */ }
//! ```

pub mod heuristics;
pub mod noise;
pub mod rules;
pub mod scoring;
pub mod types;

pub use noise::{NoiseSource, SeededNoise};
pub use rules::{HeuristicRules, NoiseRule, BLOCK_THRESHOLD, FLAG_THRESHOLD};
pub use scoring::RiskEngine;
pub use types::{Decision, RiskMetadata, RiskResult, ScoredTransaction};
