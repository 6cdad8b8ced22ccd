//! Pipeline - tick processing across nodes
//!
//! One tick = the transactions every node produced since the last tick.
//! Valid transactions are scored concurrently, observers get one event per
//! result, and the aggregator sees the whole tick as a single batch.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use super::aggregator::{Aggregator, BatchEntry, BatchSummary, GlobalStats};
use super::clock::Clock;
use super::config::{EngineConfig, ScoringSwitches};
use super::engine::{RiskEngine, ScoredTransaction};
use super::events::{EventBus, PipelineEvent};
use super::profile::ProfileStore;
use super::reputation::{ReputationCache, ReputationStatus};
use super::scorer::{RemoteScorer, ScorerError, ScorerHealth};
use super::transaction::{Transaction, TransactionError};
use crate::constants::{EVENT_CHANNEL_CAPACITY, NODE_HISTORY_LIMIT};

/// Transaction refused before scoring
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedTransaction {
    pub id: String,
    pub source_node_id: String,
    pub error: String,
}

impl RejectedTransaction {
    fn new(tx: &Transaction, error: &TransactionError) -> Self {
        Self {
            id: tx.id.clone(),
            source_node_id: tx.source_node_id.clone(),
            error: error.to_string(),
        }
    }
}

/// Outcome of one tick
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    /// Scored transactions in submission order
    pub results: Vec<ScoredTransaction>,
    pub rejected: Vec<RejectedTransaction>,
    pub global: GlobalStats,
}

/// Outcome of one maintenance sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub reputation_purged: usize,
    pub profiles_evicted: usize,
    /// Reputation records still live after the sweep
    pub reputation_active: usize,
}

pub struct Pipeline<S: RemoteScorer> {
    engine: Arc<RiskEngine<S>>,
    aggregator: Aggregator,
    events: EventBus,
    history: Mutex<HashMap<String, VecDeque<ScoredTransaction>>>,
    clock: Arc<dyn Clock>,
}

impl<S: RemoteScorer> Pipeline<S> {
    /// Build a pipeline with fresh stores sized from `config`
    pub fn new(scorer: S, config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let reputation = Arc::new(ReputationCache::new(config.reputation_ttl, clock.clone()));
        let profiles = Arc::new(ProfileStore::new(
            config.profile_capacity,
            config.profile_idle_ttl,
            clock.clone(),
        ));
        let engine = RiskEngine::new(scorer, reputation, profiles, config);
        Self::from_engine(engine, clock)
    }

    pub fn from_engine(engine: RiskEngine<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine: Arc::new(engine),
            aggregator: Aggregator::new(clock.clone()),
            events: EventBus::new(EVENT_CHANNEL_CAPACITY),
            history: Mutex::new(HashMap::new()),
            clock,
        }
    }

    // ========================================================================
    // PROCESSING
    // ========================================================================

    /// Score one tick and fold it into the global stats
    pub async fn process_tick(&self, transactions: Vec<Transaction>) -> TickReport {
        let mut rejected = Vec::new();
        let mut tasks = JoinSet::new();

        for (index, tx) in transactions.into_iter().enumerate() {
            if let Err(e) = tx.validate() {
                log::warn!("[PIPELINE] Rejected transaction: {}", e);
                rejected.push(RejectedTransaction::new(&tx, &e));
                continue;
            }

            let engine = self.engine.clone();
            tasks.spawn(async move {
                let result = engine.score(&tx).await;
                (index, ScoredTransaction { transaction: tx, result })
            });
        }

        let mut scored = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => scored.push(entry),
                Err(e) => log::error!("[PIPELINE] Scoring task failed: {}", e),
            }
        }
        scored.sort_by_key(|(index, _)| *index);
        let results: Vec<ScoredTransaction> = scored.into_iter().map(|(_, s)| s).collect();

        let global = self.publish(&results);
        log::debug!(
            "[PIPELINE] Tick done: {} scored, {} rejected, threat={}",
            results.len(),
            rejected.len(),
            global.threat_level
        );

        TickReport { results, rejected, global }
    }

    /// Score a single transaction as a one-element batch
    pub async fn score_one(&self, tx: Transaction) -> Result<ScoredTransaction, TransactionError> {
        tx.validate()?;

        let result = self.engine.score(&tx).await;
        let scored = ScoredTransaction { transaction: tx, result };
        self.publish(std::slice::from_ref(&scored));
        Ok(scored)
    }

    /// Emit events, record history, run the aggregator once
    fn publish(&self, results: &[ScoredTransaction]) -> GlobalStats {
        for scored in results {
            self.events.emit_scored(scored.clone());
        }
        self.record_history(results);

        let batch: Vec<BatchEntry> = results.iter().map(|s| BatchEntry::from(&s.result)).collect();
        let global = self.aggregator.update(&batch);
        if !batch.is_empty() {
            self.events.emit_stats(global.clone(), self.clock.now());
        }
        global
    }

    fn record_history(&self, results: &[ScoredTransaction]) {
        if results.is_empty() {
            return;
        }

        let mut history = self.history.lock();
        for scored in results {
            let node = history
                .entry(scored.transaction.source_node_id.clone())
                .or_default();
            if node.len() >= NODE_HISTORY_LIMIT {
                node.pop_front();
            }
            node.push_back(scored.clone());
        }
    }

    // ========================================================================
    // MAINTENANCE
    // ========================================================================

    /// Drop expired reputation records and idle profiles.
    ///
    /// Reads only purge the record they hit, so users that are never looked
    /// up again stay in memory until this runs.
    pub fn sweep(&self) -> SweepReport {
        let reputation = self.engine.reputation();
        let reputation_purged = reputation.purge_expired();
        let profiles_evicted = self.engine.profiles().evict_idle();
        let stats = reputation.stats();

        log::debug!(
            "[PIPELINE] Sweep: purged {} reputation records, evicted {} profiles ({} records active)",
            reputation_purged,
            profiles_evicted,
            stats.active_records
        );

        SweepReport {
            reputation_purged,
            profiles_evicted,
            reputation_active: stats.active_records,
        }
    }

    /// Run [`Pipeline::sweep`] every `period` until the pipeline is dropped
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(pipeline) = weak.upgrade() else {
                    log::debug!("[PIPELINE] Pipeline dropped, sweeper exiting");
                    break;
                };
                pipeline.sweep();
            }
        })
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn stats(&self) -> GlobalStats {
        self.aggregator.snapshot()
    }

    pub fn stats_history(&self) -> Vec<BatchSummary> {
        self.aggregator.history()
    }

    /// Recent results for one node, newest last
    pub fn node_history(&self, node_id: &str) -> Vec<ScoredTransaction> {
        self.history
            .lock()
            .get(node_id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Reputation of `user_id` as seen by `node_id`
    pub fn check_reputation(&self, user_id: &str, node_id: &str) -> ReputationStatus {
        self.engine.reputation().check_reputation(user_id, node_id)
    }

    pub fn switches(&self) -> &Arc<ScoringSwitches> {
        self.engine.switches()
    }

    pub fn engine(&self) -> &Arc<RiskEngine<S>> {
        &self.engine
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    pub async fn scorer_health(&self) -> Result<ScorerHealth, ScorerError> {
        self.engine.scorer().health().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::clock::ManualClock;
    use crate::logic::engine::Decision;
    use crate::logic::scorer::{ScoreRequest, ScoreResponse};

    /// Scores by amount: >= 1000 is 90, otherwise 10
    struct AmountScorer;

    impl RemoteScorer for AmountScorer {
        async fn predict(&self, request: &ScoreRequest) -> Result<ScoreResponse, ScorerError> {
            let score = if request.amount >= 1000.0 { 90 } else { 10 };
            Ok(ScoreResponse {
                score,
                decision: String::new(),
                factors: vec!["AMOUNT_MODEL".to_string()],
                model_version: "amount-v1".to_string(),
            })
        }

        async fn health(&self) -> Result<ScorerHealth, ScorerError> {
            Err(ScorerError::Disabled)
        }
    }

    fn pipeline() -> Pipeline<AmountScorer> {
        let _ = env_logger::builder().is_test(true).try_init();
        let clock = Arc::new(ManualClock::starting_now());
        let config = EngineConfig::default().with_scorer_timeout(Duration::from_millis(200));
        Pipeline::new(AmountScorer, config, clock)
    }

    #[tokio::test]
    async fn test_tick_scores_in_submission_order() {
        let pipeline = pipeline();
        let txs = vec![
            Transaction::new("BANK_A", "u1", 50.0),
            Transaction::new("BANK_B", "u2", 5000.0),
            Transaction::new("BANK_A", "u3", 75.0),
        ];
        let ids: Vec<String> = txs.iter().map(|t| t.id.clone()).collect();

        let report = pipeline.process_tick(txs).await;

        let got: Vec<String> = report.results.iter().map(|s| s.transaction.id.clone()).collect();
        assert_eq!(got, ids);
        assert_eq!(report.results[1].result.decision, Decision::Block);
        assert_eq!(report.global.total_transactions, 3);
        assert_eq!(report.global.blocked_count, 1);
    }

    #[tokio::test]
    async fn test_invalid_transactions_are_rejected_not_scored() {
        let pipeline = pipeline();
        let txs = vec![
            Transaction::new("BANK_A", "u1", -5.0),
            Transaction::new("BANK_A", "", 10.0),
            Transaction::new("BANK_B", "u2", 10.0),
        ];

        let report = pipeline.process_tick(txs).await;

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.global.total_transactions, 1);
    }

    #[tokio::test]
    async fn test_empty_tick_leaves_stats_unchanged() {
        let pipeline = pipeline();
        pipeline.process_tick(vec![Transaction::new("BANK_A", "u1", 10.0)]).await;
        let before = pipeline.stats();

        let report = pipeline.process_tick(Vec::new()).await;
        assert_eq!(report.global, before);
        assert_eq!(pipeline.stats_history().len(), 1);
    }

    #[tokio::test]
    async fn test_cross_node_block_in_following_tick() {
        let pipeline = pipeline();

        pipeline.process_tick(vec![Transaction::new("BANK_A", "mule", 2500.0)]).await;
        let report = pipeline.process_tick(vec![Transaction::new("BANK_B", "mule", 5.0)]).await;

        let result = &report.results[0].result;
        assert_eq!(result.score, 100);
        assert_eq!(result.primary_reason(), Some("FEDERATED_BLACKLIST_MATCH"));
        // BANK_B's own block overwrote the record, so only BANK_A is now warned
        assert!(pipeline.check_reputation("mule", "BANK_A").is_untrusted());
        assert!(pipeline.check_reputation("mule", "BANK_B").is_trusted());
    }

    #[tokio::test]
    async fn test_node_history_is_bounded() {
        let pipeline = pipeline();
        for _ in 0..(NODE_HISTORY_LIMIT + 5) {
            pipeline.score_one(Transaction::new("BANK_A", "u1", 10.0)).await.unwrap();
        }
        let last = pipeline.score_one(Transaction::new("BANK_A", "u1", 11.0)).await.unwrap();

        let history = pipeline.node_history("BANK_A");
        assert_eq!(history.len(), NODE_HISTORY_LIMIT);
        assert_eq!(history.last().map(|s| s.transaction.id.clone()), Some(last.transaction.id));
        assert!(pipeline.node_history("BANK_B").is_empty());
    }

    #[tokio::test]
    async fn test_observers_receive_events() {
        let pipeline = pipeline();
        let mut rx = pipeline.subscribe();

        pipeline.process_tick(vec![Transaction::new("BANK_A", "u1", 10.0)]).await;

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, PipelineEvent::TransactionScored(_)));
        let second = rx.recv().await.unwrap();
        assert!(matches!(second, PipelineEvent::StatsUpdate { .. }));
    }

    fn pipeline_with_clock() -> (Arc<Pipeline<AmountScorer>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let pipeline = Pipeline::new(AmountScorer, EngineConfig::default(), clock.clone());
        (Arc::new(pipeline), clock)
    }

    #[tokio::test]
    async fn test_sweep_drops_records_nobody_reads() {
        let (pipeline, clock) = pipeline_with_clock();
        let reputation = pipeline.engine().reputation();
        for i in 0..1000 {
            reputation.broadcast_block(&format!("user-{i}"), "BANK_A", "HIGH_VALUE_FALLBACK");
        }
        pipeline.score_one(Transaction::new("BANK_B", "alice", 10.0)).await.unwrap();

        clock.advance(chrono::Duration::hours(24));
        let report = pipeline.sweep();

        assert_eq!(report.reputation_purged, 1000);
        assert_eq!(report.profiles_evicted, 1);
        assert_eq!(report.reputation_active, 0);
        assert!(reputation.is_empty());
        assert!(pipeline.engine().profiles().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_keeps_live_records() {
        let (pipeline, clock) = pipeline_with_clock();
        let reputation = pipeline.engine().reputation();
        reputation.broadcast_block("old", "BANK_A", "R1");
        clock.advance(chrono::Duration::seconds(200));
        reputation.broadcast_block("fresh", "BANK_A", "R2");
        clock.advance(chrono::Duration::seconds(150));

        let report = pipeline.sweep();
        assert_eq!(report.reputation_purged, 1);
        assert_eq!(report.reputation_active, 1);
        assert!(pipeline.check_reputation("fresh", "BANK_B").is_untrusted());
    }

    #[tokio::test]
    async fn test_sweeper_runs_in_background() {
        let (pipeline, clock) = pipeline_with_clock();
        pipeline.engine().reputation().broadcast_block("mule", "BANK_A", "R1");
        clock.advance(chrono::Duration::hours(1));

        let handle = pipeline.spawn_sweeper(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(pipeline.engine().reputation().is_empty());
        handle.abort();
    }

    #[tokio::test]
    async fn test_score_one_rejects_malformed() {
        let pipeline = pipeline();
        let mut tx = Transaction::new("BANK_A", "u1", 10.0);
        tx.id = String::new();

        assert_eq!(pipeline.score_one(tx).await, Err(TransactionError::MissingId));
        assert_eq!(pipeline.stats().total_transactions, 0);
    }
}
