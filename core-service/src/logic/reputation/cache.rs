//! Reputation Cache - cross-node shared blocklist with TTL
//!
//! When node A blocks a user it broadcasts the block here; node B consults
//! the cache before scoring and distrusts the user immediately. Keys are the
//! SHA-256 of the userId, so the cache never holds raw identifiers.
//!
//! Records are last-writer-wins and are never held against the node that
//! reported them. A read that hits an expired record removes it; records
//! nobody reads are left to `purge_expired`, which the pipeline sweeper
//! calls periodically.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use super::types::{ReputationRecord, ReputationStats, ReputationStatus};
use crate::constants::FEDERATION_SOURCE;
use crate::logic::clock::Clock;

pub struct ReputationCache {
    records: RwLock<HashMap<String, ReputationRecord>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ReputationCache {
    /// Delay between a broadcast and its visibility to other nodes.
    ///
    /// The cache is in-process: a broadcast is visible to every read issued
    /// after it returns. A distributed replacement must publish its own bound
    /// here and callers must not assume sub-TTL propagation is instantaneous.
    pub const PROPAGATION_DELAY: std::time::Duration = std::time::Duration::ZERO;

    pub fn new(ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(36_500)),
            clock,
        }
    }

    /// Upsert a block signal for `user_id` stamped with the current time
    pub fn broadcast_block(&self, user_id: &str, reporting_node_id: &str, reason: &str) {
        let key = anonymize(user_id);
        log::info!(
            "[FEDERATION] {} reported threat on user {} ({})",
            reporting_node_id,
            &key[..12],
            reason
        );

        let record = ReputationRecord {
            reporting_node_id: reporting_node_id.to_string(),
            recorded_at: self.clock.now(),
            reason: reason.to_string(),
        };
        self.records.write().insert(key, record);
    }

    /// Look up `user_id` on behalf of `querying_node_id`
    pub fn check_reputation(&self, user_id: &str, querying_node_id: &str) -> ReputationStatus {
        let key = anonymize(user_id);
        let now = self.clock.now();

        let status = {
            let records = self.records.read();
            let Some(record) = records.get(&key) else {
                return ReputationStatus::Trusted;
            };
            if now - record.recorded_at > self.ttl {
                None
            } else if record.reporting_node_id == querying_node_id {
                // A node's own historical block never re-penalizes that node
                Some(ReputationStatus::Trusted)
            } else {
                Some(ReputationStatus::Untrusted {
                    source: FEDERATION_SOURCE.to_string(),
                    original_timestamp: record.recorded_at,
                    reason: record.reason.clone(),
                })
            }
        };
        if let Some(status) = status {
            return status;
        }

        // Stale: re-check under the write lock, a fresh broadcast may have landed
        let mut records = self.records.write();
        let still_stale = records
            .get(&key)
            .map(|r| now - r.recorded_at > self.ttl);
        match still_stale {
            None => ReputationStatus::Trusted,
            Some(true) => {
                records.remove(&key);
                log::debug!("[FEDERATION] Purged stale record for user {}", &key[..12]);
                ReputationStatus::Expired
            }
            Some(false) => match records.get(&key) {
                Some(record) if record.reporting_node_id != querying_node_id => {
                    ReputationStatus::Untrusted {
                        source: FEDERATION_SOURCE.to_string(),
                        original_timestamp: record.recorded_at,
                        reason: record.reason.clone(),
                    }
                }
                _ => ReputationStatus::Trusted,
            },
        }
    }

    /// Remove every record past the TTL; returns how many were purged
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|_, r| now - r.recorded_at <= self.ttl);
        let purged = before - records.len();
        if purged > 0 {
            log::debug!("[FEDERATION] Purged {} stale records", purged);
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> ReputationStats {
        let now = self.clock.now();
        let records = self.records.read();
        let stale = records
            .values()
            .filter(|r| now - r.recorded_at > self.ttl)
            .count();

        ReputationStats {
            total_records: records.len(),
            active_records: records.len() - stale,
            stale_records: stale,
        }
    }
}

/// Hex SHA-256 of a userId
pub fn anonymize(user_id: &str) -> String {
    hex::encode(Sha256::digest(user_id.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::clock::ManualClock;

    fn cache() -> (ReputationCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let cache = ReputationCache::new(std::time::Duration::from_secs(300), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_unknown_user_is_trusted() {
        let (cache, _) = cache();
        assert_eq!(cache.check_reputation("USER_1", "BANK_A"), ReputationStatus::Trusted);
    }

    #[test]
    fn test_block_is_visible_to_other_nodes() {
        let (cache, clock) = cache();
        let blocked_at = clock.now();
        cache.broadcast_block("USER_1", "BANK_A", "HIGH_VALUE_FALLBACK");

        clock.advance(Duration::seconds(30));
        match cache.check_reputation("USER_1", "BANK_B") {
            ReputationStatus::Untrusted { source, original_timestamp, reason } => {
                assert_eq!(source, FEDERATION_SOURCE);
                assert_eq!(original_timestamp, blocked_at);
                assert_eq!(reason, "HIGH_VALUE_FALLBACK");
            }
            other => panic!("expected UNTRUSTED, got {:?}", other),
        }
    }

    #[test]
    fn test_self_exclusion() {
        let (cache, _) = cache();
        cache.broadcast_block("USER_1", "BANK_A", "VELOCITY_SPIKE_FALLBACK");

        assert_eq!(cache.check_reputation("USER_1", "BANK_A"), ReputationStatus::Trusted);
        // Record survives a self-excluded read
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_record_is_purged() {
        let (cache, clock) = cache();
        cache.broadcast_block("USER_1", "BANK_A", "HIGH_VALUE_FALLBACK");

        clock.advance(Duration::seconds(301));
        let status = cache.check_reputation("USER_1", "BANK_B");
        assert_eq!(status, ReputationStatus::Expired);
        assert!(status.is_trusted());
        assert!(cache.is_empty());

        assert_eq!(cache.check_reputation("USER_1", "BANK_B"), ReputationStatus::Trusted);
    }

    #[test]
    fn test_record_at_exact_ttl_still_honored() {
        let (cache, clock) = cache();
        cache.broadcast_block("USER_1", "BANK_A", "HIGH_VALUE_FALLBACK");

        clock.advance(Duration::seconds(300));
        assert!(cache.check_reputation("USER_1", "BANK_B").is_untrusted());
    }

    #[test]
    fn test_last_writer_wins() {
        let (cache, clock) = cache();
        cache.broadcast_block("USER_1", "BANK_A", "HIGH_VALUE_FALLBACK");
        clock.advance(Duration::seconds(10));
        cache.broadcast_block("USER_1", "BANK_B", "VELOCITY_SPIKE_FALLBACK");

        assert_eq!(cache.len(), 1);
        // BANK_B now owns the record, so BANK_A sees it and BANK_B does not
        assert!(cache.check_reputation("USER_1", "BANK_A").is_untrusted());
        assert_eq!(cache.check_reputation("USER_1", "BANK_B"), ReputationStatus::Trusted);
    }

    #[test]
    fn test_purge_expired_and_stats() {
        let (cache, clock) = cache();
        cache.broadcast_block("USER_1", "BANK_A", "R1");
        clock.advance(Duration::seconds(200));
        cache.broadcast_block("USER_2", "BANK_A", "R2");
        clock.advance(Duration::seconds(150));

        let stats = cache.stats();
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.stale_records, 1);

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_reads_and_broadcasts() {
        let (cache, _) = cache();
        let cache = Arc::new(cache);
        cache.broadcast_block("USER_1", "BANK_A", "HIGH_VALUE_FALLBACK");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        assert!(cache.check_reputation("USER_1", "BANK_B").is_untrusted());
                        cache.broadcast_block(&format!("OTHER_{i}"), "BANK_A", "R");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 9);
    }

    #[test]
    fn test_keys_are_anonymized() {
        let key = anonymize("USER_1");
        assert_eq!(key.len(), 64);
        assert_ne!(key, "USER_1");
        assert_eq!(key, anonymize("USER_1"));
    }
}
