//! Event Bus - observer fan-out
//!
//! Scoring results and stats snapshots are published on a tokio broadcast
//! channel. Emitting never blocks and never fails: with no subscribers the
//! event is dropped, and slow subscribers lag instead of stalling scoring.
//!
//! The HTTP server does not subscribe; events are for embedders that bring
//! their own transport, such as a websocket push.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use super::aggregator::GlobalStats;
use super::engine::ScoredTransaction;

/// Event names
pub mod events {
    pub const TRANSACTION_SCORED: &str = "transaction:scored";
    pub const STATS_UPDATE: &str = "stats:update";
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum PipelineEvent {
    #[serde(rename = "transaction:scored")]
    TransactionScored(ScoredTransaction),
    #[serde(rename = "stats:update")]
    StatsUpdate {
        global: GlobalStats,
        timestamp: DateTime<Utc>,
    },
}

impl PipelineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::TransactionScored(_) => events::TRANSACTION_SCORED,
            PipelineEvent::StatsUpdate { .. } => events::STATS_UPDATE,
        }
    }
}

pub struct EventBus {
    sender: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Emit event to all subscribers
    pub fn emit(&self, event: PipelineEvent) {
        let name = event.name();
        if self.sender.send(event).is_err() {
            log::trace!("No subscribers, event '{}' dropped", name);
        }
    }

    pub fn emit_scored(&self, scored: ScoredTransaction) {
        self.emit(PipelineEvent::TransactionScored(scored));
    }

    pub fn emit_stats(&self, global: GlobalStats, timestamp: DateTime<Utc>) {
        self.emit(PipelineEvent::StatsUpdate { global, timestamp });
    }
}
