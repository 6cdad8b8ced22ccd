//! Behavioral profile types
//!
//! Data structures only; the store in `store.rs` owns every profile.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    at: DateTime<Utc>,
    amount: f64,
}

/// Per-user history: last location, last sighting and a sliding window of
/// recent (timestamp, amount) pairs ordered by timestamp.
#[derive(Debug, Clone)]
pub struct BehavioralProfile {
    pub last_location: Option<String>,
    pub last_seen_at: Option<DateTime<Utc>>,
    /// Clock time of the last touch, drives idle eviction
    pub last_touched: DateTime<Utc>,
    window: VecDeque<WindowEntry>,
}

impl BehavioralProfile {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_location: None,
            last_seen_at: None,
            last_touched: now,
            window: VecDeque::new(),
        }
    }

    /// Record one transaction and return the snapshot the heuristics read.
    ///
    /// Entries older than `window` relative to the newest entry are pruned
    /// on every call.
    pub fn record(
        &mut self,
        timestamp: DateTime<Utc>,
        amount: f64,
        location: &str,
        window: Duration,
        now: DateTime<Utc>,
    ) -> ProfileSnapshot {
        let previous_location = self.last_location.take();
        let previous_seen_at = self.last_seen_at;

        // Keep the window ordered even when timestamps arrive out of order
        let pos = self.window.partition_point(|e| e.at <= timestamp);
        self.window.insert(pos, WindowEntry { at: timestamp, amount });

        if let Some(newest) = self.window.back().map(|e| e.at) {
            while let Some(front) = self.window.front() {
                if newest - front.at >= window {
                    self.window.pop_front();
                } else {
                    break;
                }
            }
        }

        self.last_location = Some(location.to_string());
        self.last_seen_at = Some(timestamp);
        self.last_touched = now;

        let window_count = self.window.len();
        let total: f64 = self.window.iter().map(|e| e.amount).sum();
        let window_mean_amount = if window_count > 0 {
            total / window_count as f64
        } else {
            0.0
        };

        ProfileSnapshot {
            window_count,
            window_mean_amount,
            previous_location,
            previous_seen_at,
        }
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }
}

/// What the heuristic scorer sees after a touch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    /// Transactions inside the trailing window, current one included
    pub window_count: usize,
    /// Mean amount over the same window
    pub window_mean_amount: f64,
    /// Location before this touch
    pub previous_location: Option<String>,
    /// Timestamp of the previous sighting
    pub previous_seen_at: Option<DateTime<Utc>>,
}

impl ProfileSnapshot {
    /// Percentage deviation of `amount` from the window mean
    pub fn deviation_pct(&self, amount: f64) -> f64 {
        if self.window_mean_amount > 0.0 {
            (amount - self.window_mean_amount) / self.window_mean_amount * 100.0
        } else {
            0.0
        }
    }
}
