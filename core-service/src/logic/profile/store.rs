//! Behavioral Profile Store
//!
//! One profile per userId, created lazily and touched on every scoring call.
//! All access goes through a single mutex, so touches for the same user are
//! serialized and never lose updates.
//!
//! Memory is bounded two ways: profiles idle past `idle_ttl` are dropped, and
//! when the store is still full the oldest 10% (by last touch) are evicted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use super::types::{BehavioralProfile, ProfileSnapshot};
use crate::constants::VELOCITY_WINDOW_SECS;
use crate::logic::clock::Clock;

pub struct ProfileStore {
    profiles: Mutex<HashMap<String, BehavioralProfile>>,
    capacity: usize,
    idle_ttl: Duration,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl ProfileStore {
    pub fn new(capacity: usize, idle_ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            idle_ttl: Duration::from_std(idle_ttl).unwrap_or_else(|_| Duration::days(36_500)),
            window: Duration::seconds(VELOCITY_WINDOW_SECS),
            clock,
        }
    }

    /// Record a transaction for `user_id` and return the window snapshot.
    pub fn touch(
        &self,
        user_id: &str,
        timestamp: DateTime<Utc>,
        amount: f64,
        location: &str,
    ) -> ProfileSnapshot {
        let now = self.clock.now();
        let mut profiles = self.profiles.lock();

        if !profiles.contains_key(user_id) && profiles.len() >= self.capacity {
            self.evict_locked(&mut profiles, now);
        }

        profiles
            .entry(user_id.to_string())
            .or_insert_with(|| BehavioralProfile::new(now))
            .record(timestamp, amount, location, self.window, now)
    }

    /// Last known location of a user, if any
    pub fn last_location(&self, user_id: &str) -> Option<String> {
        self.profiles
            .lock()
            .get(user_id)
            .and_then(|p| p.last_location.clone())
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.profiles.lock().contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.profiles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop profiles idle past the TTL; returns how many were removed
    pub fn evict_idle(&self) -> usize {
        let now = self.clock.now();
        let mut profiles = self.profiles.lock();
        let evicted = Self::evict_idle_locked(&mut profiles, now, self.idle_ttl);
        if evicted > 0 {
            log::debug!("[PROFILE] Evicted {} idle profiles", evicted);
        }
        evicted
    }

    fn evict_idle_locked(
        profiles: &mut HashMap<String, BehavioralProfile>,
        now: DateTime<Utc>,
        idle_ttl: Duration,
    ) -> usize {
        let before = profiles.len();
        profiles.retain(|_, p| now - p.last_touched < idle_ttl);
        before - profiles.len()
    }

    fn evict_locked(&self, profiles: &mut HashMap<String, BehavioralProfile>, now: DateTime<Utc>) {
        let idle = Self::evict_idle_locked(profiles, now, self.idle_ttl);
        if profiles.len() < self.capacity {
            log::debug!("[PROFILE] Evicted {} idle profiles", idle);
            return;
        }

        // Still full: drop the least recently touched 10%
        let mut entries: Vec<_> = profiles
            .iter()
            .map(|(k, v)| (k.clone(), v.last_touched))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1));

        let remove_count = (self.capacity / 10).max(1);
        for (user_id, _) in entries.into_iter().take(remove_count) {
            profiles.remove(&user_id);
        }

        log::debug!(
            "[PROFILE] Store full, evicted {} idle + {} least recent profiles",
            idle,
            remove_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::clock::ManualClock;

    fn store_with(capacity: usize) -> (ProfileStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let store = ProfileStore::new(capacity, std::time::Duration::from_secs(3600), clock.clone());
        (store, clock)
    }

    #[test]
    fn test_touch_counts_window() {
        let (store, clock) = store_with(100);
        let start = clock.now();

        let mut last = None;
        for i in 0..6 {
            last = Some(store.touch("USER_1", start + Duration::seconds(i), 50.0, "NYC"));
        }

        let snap = last.unwrap();
        assert_eq!(snap.window_count, 6);
        assert!((snap.window_mean_amount - 50.0).abs() < f64::EPSILON);
        assert_eq!(store.last_location("USER_1").as_deref(), Some("NYC"));
    }

    #[test]
    fn test_users_are_isolated() {
        let (store, clock) = store_with(100);
        let now = clock.now();

        store.touch("USER_1", now, 10.0, "NYC");
        let snap = store.touch("USER_2", now, 10.0, "NYC");

        assert_eq!(snap.window_count, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_idle_profiles_are_evicted() {
        let (store, clock) = store_with(100);
        let now = clock.now();

        store.touch("USER_1", now, 10.0, "NYC");
        clock.advance(Duration::hours(2));
        store.touch("USER_2", clock.now(), 10.0, "NYC");

        assert_eq!(store.evict_idle(), 1);
        assert!(!store.contains("USER_1"));
        assert!(store.contains("USER_2"));
    }

    #[test]
    fn test_capacity_is_bounded() {
        let (store, clock) = store_with(10);

        for i in 0..25 {
            clock.advance(Duration::seconds(1));
            store.touch(&format!("USER_{}", i), clock.now(), 10.0, "NYC");
        }

        assert!(store.len() <= 10);
        // Most recent user always survives
        assert!(store.contains("USER_24"));
    }

    #[test]
    fn test_concurrent_touches_do_not_lose_updates() {
        let (store, clock) = store_with(100);
        let store = Arc::new(store);
        let now = clock.now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        store.touch("SHARED", now, 1.0, "NYC");
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let snap = store.touch("SHARED", now, 1.0, "NYC");
        assert_eq!(snap.window_count, 41);
    }
}
