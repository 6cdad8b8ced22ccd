//! Risk Scoring Engine
//!
//! Combines the federated reputation seed, the remote model score and the
//! local fallback heuristics into one `RiskResult`.
//!
//! # Flow
//!
//! ```text
//! Transaction
//!    │
//!    ├─ reputation check ──► seed 100 + FEDERATED_BLACKLIST_MATCH (foreign block)
//!    ├─ profile touch    ──► ProfileSnapshot (window includes this tx)
//!    │
//!    ├─ remote scorer (≤ timeout) ──ok──► max(seed, remote)
//!    │                           └─err──► seed + heuristic points
//!    │
//!    ├─ cap at 100, map to decision
//!    └─ BLOCK + propagation on ──► broadcast to the reputation cache
//! ```
//!
//! `score` never fails: every remote failure degrades to the heuristics.

use std::sync::Arc;

use parking_lot::Mutex;

use super::heuristics::{self, HeuristicOutcome};
use super::noise::{NoiseSource, SeededNoise};
use super::rules::{reasons, FEDERATED_PENALTY, MAX_SCORE};
use super::types::{Decision, RiskResult};
use crate::constants::FALLBACK_SCORER_VERSION;
use crate::logic::config::{EngineConfig, ScoringSwitches};
use crate::logic::profile::{ProfileSnapshot, ProfileStore};
use crate::logic::reputation::ReputationCache;
use crate::logic::scorer::{
    CircuitBreaker, CircuitState, RemoteScorer, ScoreRequest, ScoreResponse, ScorerError,
};
use crate::logic::transaction::Transaction;

pub struct RiskEngine<S: RemoteScorer> {
    scorer: S,
    reputation: Arc<ReputationCache>,
    profiles: Arc<ProfileStore>,
    switches: Arc<ScoringSwitches>,
    breaker: CircuitBreaker,
    noise: Option<Mutex<Box<dyn NoiseSource>>>,
    config: EngineConfig,
}

impl<S: RemoteScorer> RiskEngine<S> {
    pub fn new(
        scorer: S,
        reputation: Arc<ReputationCache>,
        profiles: Arc<ProfileStore>,
        config: EngineConfig,
    ) -> Self {
        let noise = config.noise_enabled.then(|| {
            Mutex::new(Box::new(SeededNoise::new(config.noise_seed)) as Box<dyn NoiseSource>)
        });

        Self {
            scorer,
            reputation,
            profiles,
            switches: Arc::new(ScoringSwitches::new(config.remote_enabled, true)),
            breaker: CircuitBreaker::new(config.breaker_failure_threshold, config.breaker_reset),
            noise,
            config,
        }
    }

    /// Share switches with an outer surface (API controls)
    pub fn with_switches(mut self, switches: Arc<ScoringSwitches>) -> Self {
        self.switches = switches;
        self
    }

    /// Replace the configured noise source
    pub fn with_noise_source(mut self, noise: Box<dyn NoiseSource>) -> Self {
        self.noise = Some(Mutex::new(noise));
        self
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    pub fn reputation(&self) -> &Arc<ReputationCache> {
        &self.reputation
    }

    pub fn profiles(&self) -> &Arc<ProfileStore> {
        &self.profiles
    }

    pub fn switches(&self) -> &Arc<ScoringSwitches> {
        &self.switches
    }

    pub fn breaker_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // SCORING
    // ========================================================================

    /// Score one transaction. Always produces a result.
    pub async fn score(&self, tx: &Transaction) -> RiskResult {
        let mut points: u32 = 0;
        let mut fired: Vec<String> = Vec::new();

        // 1. Federated reputation seed
        let reputation = self.reputation.check_reputation(&tx.user_id, &tx.source_node_id);
        if reputation.is_untrusted() {
            log::warn!(
                "[ENGINE] Federated blacklist match for tx {} on {}",
                tx.id,
                tx.source_node_id
            );
            points = FEDERATED_PENALTY;
            fired.push(reasons::FEDERATED_BLACKLIST_MATCH.to_string());
        }

        // 2. Profile update, exactly once per scored transaction
        let snapshot = self.profiles.touch(&tx.user_id, tx.timestamp, tx.amount, &tx.location);

        // 3. Remote model, else local heuristics
        let (scorer_version, metadata) = match self.call_remote(tx).await {
            Ok(response) => {
                let remote = response.score.clamp(0, MAX_SCORE as i64) as u32;
                points = points.max(remote);
                for factor in response.factors {
                    if !fired.contains(&factor) {
                        fired.push(factor);
                    }
                }
                (response.model_version, None)
            }
            Err(e) => {
                log::debug!("[ENGINE] Fallback scoring for tx {}: {}", tx.id, e);
                let mut outcome = self.evaluate_fallback(tx, &snapshot);
                points += outcome.points;
                fired.append(&mut outcome.reasons);
                outcome.metadata.fallback_cause = Some(e.to_string());
                (FALLBACK_SCORER_VERSION.to_string(), Some(outcome.metadata))
            }
        };

        // 4. Cap and decide
        let score = points.min(MAX_SCORE) as u8;
        normalize_reasons(score, &mut fired);
        let decision = Decision::from_score(score);

        // 5. Propagate blocks to the federation
        if decision == Decision::Block && self.switches.is_propagation_enabled() {
            let reason = fired
                .first()
                .map(String::as_str)
                .unwrap_or(reasons::MODEL_RISK_SCORE);
            self.reputation.broadcast_block(&tx.user_id, &tx.source_node_id, reason);
        }

        log::debug!(
            "[ENGINE] tx {} node={} score={} decision={} via {}",
            tx.id,
            tx.source_node_id,
            score,
            decision,
            scorer_version
        );

        RiskResult {
            score,
            decision,
            reasons: fired,
            scorer_version,
            metadata,
        }
    }

    /// Remote call bounded by the configured timeout
    async fn call_remote(&self, tx: &Transaction) -> Result<ScoreResponse, ScorerError> {
        if !self.switches.is_remote_enabled() {
            return Err(ScorerError::Disabled);
        }
        let Some(permit) = self.breaker.try_acquire() else {
            return Err(ScorerError::CircuitOpen);
        };

        let request = ScoreRequest::from(tx);
        let timeout = self.config.scorer_timeout;
        let result = match tokio::time::timeout(timeout, self.scorer.predict(&request)).await {
            Ok(result) => result,
            Err(_) => Err(ScorerError::Timeout(timeout.as_millis() as u64)),
        };

        match &result {
            Ok(_) => permit.success(),
            Err(_) => permit.failure(),
        }
        result
    }

    fn evaluate_fallback(&self, tx: &Transaction, snapshot: &ProfileSnapshot) -> HeuristicOutcome {
        match &self.noise {
            Some(noise) => {
                let mut noise = noise.lock();
                heuristics::evaluate(tx, snapshot, &self.config.rules, Some(&mut **noise))
            }
            None => heuristics::evaluate(tx, snapshot, &self.config.rules, None),
        }
    }
}

/// Reasons are non-empty iff the score is positive
fn normalize_reasons(score: u8, fired: &mut Vec<String>) {
    if score == 0 {
        fired.clear();
    } else if fired.is_empty() {
        fired.push(reasons::MODEL_RISK_SCORE.to_string());
    }
}
