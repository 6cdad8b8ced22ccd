//! Aggregator Module - Global Threat Level
//!
//! Folds batches of `{score, decision}` outcomes from every node into
//! `GlobalStats`. Only outcomes reach this module, never raw transactions.
//!
//! # Rules
//! - Counters grow by batch composition
//! - `average = average * 0.9 + batch_mean * 0.1`, once per non-empty batch
//! - Threat level comes from the current batch alone:
//!   HIGH if high_ratio > 0.3 or mean > 60, MEDIUM if > 0.1 or > 30, else LOW
//!
//! The level has no hysteresis, so it can flip between adjacent batches.

pub mod types;

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::constants::STATS_HISTORY_LIMIT;
use crate::logic::clock::Clock;
use crate::logic::engine::Decision;

pub use types::{BatchEntry, BatchSummary, GlobalStats, ThreatLevel};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Weight kept from the previous average
const EMA_DECAY: f64 = 0.9;

const HIGH_RATIO_THRESHOLD: f64 = 0.3;
const HIGH_MEAN_THRESHOLD: f64 = 60.0;
const MEDIUM_RATIO_THRESHOLD: f64 = 0.1;
const MEDIUM_MEAN_THRESHOLD: f64 = 30.0;

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Default)]
struct AggregatorState {
    stats: GlobalStats,
    history: VecDeque<BatchSummary>,
}

pub struct Aggregator {
    state: Mutex<AggregatorState>,
    clock: Arc<dyn Clock>,
}

impl Aggregator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(AggregatorState::default()),
            clock,
        }
    }

    /// Apply one batch atomically and return the new snapshot.
    ///
    /// An empty batch changes nothing and returns the current snapshot.
    pub fn update(&self, batch: &[BatchEntry]) -> GlobalStats {
        let mut state = self.state.lock();
        if batch.is_empty() {
            return state.stats.clone();
        }

        let size = batch.len();
        let flagged = batch.iter().filter(|e| e.decision == Decision::Flag).count();
        let blocked = batch.iter().filter(|e| e.decision == Decision::Block).count();
        let sum: f64 = batch.iter().map(|e| f64::from(e.score)).sum();

        let batch_mean = sum / size as f64;
        let high_ratio = (flagged + blocked) as f64 / size as f64;
        let level = classify(high_ratio, batch_mean);

        let stats = &mut state.stats;
        stats.total_transactions += size as u64;
        stats.flagged_count += flagged as u64;
        stats.blocked_count += blocked as u64;
        stats.average_risk_score =
            stats.average_risk_score * EMA_DECAY + batch_mean * (1.0 - EMA_DECAY);

        if stats.threat_level != level {
            log::info!(
                "[AGGREGATOR] Threat level {} -> {} (ratio={:.2}, mean={:.1})",
                stats.threat_level,
                level,
                high_ratio,
                batch_mean
            );
        }
        stats.threat_level = level;
        let snapshot = stats.clone();

        if state.history.len() >= STATS_HISTORY_LIMIT {
            state.history.pop_front();
        }
        state.history.push_back(BatchSummary {
            timestamp: self.clock.now(),
            batch_size: size,
            batch_mean,
            high_ratio,
            threat_level: level,
        });

        snapshot
    }

    pub fn snapshot(&self) -> GlobalStats {
        self.state.lock().stats.clone()
    }

    /// Recent batch summaries, oldest first
    pub fn history(&self) -> Vec<BatchSummary> {
        self.state.lock().history.iter().cloned().collect()
    }
}

/// Threat level for one batch
pub fn classify(high_ratio: f64, batch_mean: f64) -> ThreatLevel {
    if high_ratio > HIGH_RATIO_THRESHOLD || batch_mean > HIGH_MEAN_THRESHOLD {
        ThreatLevel::High
    } else if high_ratio > MEDIUM_RATIO_THRESHOLD || batch_mean > MEDIUM_MEAN_THRESHOLD {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::clock::SystemClock;

    fn entry(score: u8) -> BatchEntry {
        BatchEntry {
            score,
            decision: Decision::from_score(score),
        }
    }

    fn aggregator() -> Aggregator {
        Aggregator::new(Arc::new(SystemClock))
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let agg = aggregator();
        agg.update(&[entry(90), entry(10)]);
        let before = agg.snapshot();

        let after = agg.update(&[]);
        assert_eq!(before, after);
        assert_eq!(agg.history().len(), 1);
    }

    #[test]
    fn test_two_blocks_is_high_regardless_of_mean() {
        let agg = aggregator();
        let stats = agg.update(&[
            BatchEntry { score: 20, decision: Decision::Block },
            BatchEntry { score: 20, decision: Decision::Block },
        ]);

        assert_eq!(stats.threat_level, ThreatLevel::High);
        assert_eq!(stats.blocked_count, 2);
        assert_eq!(stats.total_transactions, 2);
    }

    #[test]
    fn test_ema_applied_once_per_batch() {
        let agg = aggregator();

        let stats = agg.update(&[entry(100), entry(0)]);
        assert!((stats.average_risk_score - 5.0).abs() < 1e-9);

        let stats = agg.update(&[entry(50)]);
        assert!((stats.average_risk_score - (5.0 * 0.9 + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_counters_are_cumulative() {
        let agg = aggregator();
        agg.update(&[entry(10), entry(60), entry(85)]);
        let stats = agg.update(&[entry(55), entry(0)]);

        assert_eq!(stats.total_transactions, 5);
        assert_eq!(stats.flagged_count, 2);
        assert_eq!(stats.blocked_count, 1);
    }

    #[test]
    fn test_threat_level_is_memoryless() {
        let agg = aggregator();
        assert_eq!(agg.update(&[entry(95), entry(95)]).threat_level, ThreatLevel::High);

        let quiet: Vec<BatchEntry> = (0..10).map(|_| entry(5)).collect();
        assert_eq!(agg.update(&quiet).threat_level, ThreatLevel::Low);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0.3, 0.0), ThreatLevel::Medium);
        assert_eq!(classify(0.31, 0.0), ThreatLevel::High);
        assert_eq!(classify(0.0, 60.0), ThreatLevel::Medium);
        assert_eq!(classify(0.0, 60.5), ThreatLevel::High);
        assert_eq!(classify(0.1, 30.0), ThreatLevel::Low);
        assert_eq!(classify(0.0, 30.5), ThreatLevel::Medium);
    }

    #[test]
    fn test_history_is_bounded() {
        let agg = aggregator();
        for _ in 0..(STATS_HISTORY_LIMIT + 15) {
            agg.update(&[entry(10)]);
        }
        let history = agg.history();
        assert_eq!(history.len(), STATS_HISTORY_LIMIT);
        assert!(history.iter().all(|s| s.batch_size == 1));
    }

    #[test]
    fn test_concurrent_batches_do_not_interleave() {
        let agg = Arc::new(aggregator());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let agg = agg.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        agg.update(&[entry(90), entry(55), entry(10)]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = agg.snapshot();
        assert_eq!(stats.total_transactions, 2400);
        assert_eq!(stats.blocked_count, 800);
        assert_eq!(stats.flagged_count, 800);
    }
}
