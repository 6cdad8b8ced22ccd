//! Sentinel Core - federated transaction risk scoring
//!
//! Scores transactions from independent nodes, shares block signals across
//! them and keeps a global threat level. Transport-agnostic: the HTTP
//! surface lives in `sentinel-server`.

pub mod constants;
pub mod logic;

pub use logic::aggregator::{Aggregator, BatchEntry, BatchSummary, GlobalStats, ThreatLevel};
pub use logic::clock::{Clock, ManualClock, SystemClock};
pub use logic::config::{EngineConfig, ScoringSwitches, SwitchState};
pub use logic::engine::{Decision, RiskEngine, RiskMetadata, RiskResult, ScoredTransaction};
pub use logic::events::{EventBus, PipelineEvent};
pub use logic::pipeline::{Pipeline, RejectedTransaction, SweepReport, TickReport};
pub use logic::profile::ProfileStore;
pub use logic::reputation::{ReputationCache, ReputationStatus};
pub use logic::scorer::{HttpScorer, RemoteScorer, ScorerConfig, ScorerError, ScorerHealth};
pub use logic::transaction::{Transaction, TransactionError};
