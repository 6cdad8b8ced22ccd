//! Engine configuration and runtime kill-switches

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use super::engine::rules::HeuristicRules;

// ============================================================================
// KILL-SWITCHES
// ============================================================================

/// Runtime switches flipped by operators (or tests) without restarting.
///
/// Turning `remote` off is the "forced fallback mode": every transaction is
/// scored by the local heuristics.
#[derive(Debug)]
pub struct ScoringSwitches {
    remote: AtomicBool,
    propagation: AtomicBool,
}

impl ScoringSwitches {
    pub fn new(remote: bool, propagation: bool) -> Self {
        Self {
            remote: AtomicBool::new(remote),
            propagation: AtomicBool::new(propagation),
        }
    }

    pub fn is_remote_enabled(&self) -> bool {
        self.remote.load(Ordering::Relaxed)
    }

    pub fn is_propagation_enabled(&self) -> bool {
        self.propagation.load(Ordering::Relaxed)
    }

    pub fn set_remote(&self, val: bool) { self.remote.store(val, Ordering::Relaxed); }
    pub fn set_propagation(&self, val: bool) { self.propagation.store(val, Ordering::Relaxed); }

    pub fn snapshot(&self) -> SwitchState {
        SwitchState {
            remote_enabled: self.is_remote_enabled(),
            propagation_enabled: self.is_propagation_enabled(),
        }
    }
}

impl Default for ScoringSwitches {
    fn default() -> Self {
        Self::new(true, true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchState {
    pub remote_enabled: bool,
    pub propagation_enabled: bool,
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Initial state of the remote-scoring switch
    pub remote_enabled: bool,
    /// Hard timeout for the remote scoring call
    pub scorer_timeout: Duration,
    /// Reputation record TTL
    pub reputation_ttl: Duration,
    /// Maximum profiles held before eviction
    pub profile_capacity: usize,
    /// Profiles idle longer than this are dropped
    pub profile_idle_ttl: Duration,
    /// Consecutive failures that trip the breaker (0 = disabled)
    pub breaker_failure_threshold: u32,
    /// Open-state duration of a tripped breaker
    pub breaker_reset: Duration,
    /// Inject random-noise rules into the fallback path
    pub noise_enabled: bool,
    /// Seed for the noise source (entropy when `None`)
    pub noise_seed: Option<u64>,
    /// Fallback heuristics
    pub rules: HeuristicRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            remote_enabled: true,
            scorer_timeout: Duration::from_millis(constants::DEFAULT_SCORER_TIMEOUT_MS),
            reputation_ttl: Duration::from_secs(constants::DEFAULT_REPUTATION_TTL_SECS),
            profile_capacity: constants::DEFAULT_PROFILE_CAPACITY,
            profile_idle_ttl: Duration::from_secs(constants::DEFAULT_PROFILE_IDLE_TTL_SECS),
            breaker_failure_threshold: constants::DEFAULT_BREAKER_FAILURE_THRESHOLD,
            breaker_reset: Duration::from_secs(constants::DEFAULT_BREAKER_RESET_SECS),
            noise_enabled: false,
            noise_seed: None,
            rules: HeuristicRules::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            remote_enabled: constants::is_scorer_enabled(),
            scorer_timeout: Duration::from_millis(constants::get_scorer_timeout_ms()),
            reputation_ttl: Duration::from_secs(constants::get_reputation_ttl_secs()),
            profile_capacity: constants::get_profile_capacity(),
            profile_idle_ttl: Duration::from_secs(constants::get_profile_idle_ttl_secs()),
            breaker_failure_threshold: constants::get_breaker_failure_threshold(),
            breaker_reset: Duration::from_secs(constants::get_breaker_reset_secs()),
            noise_enabled: constants::is_noise_enabled(),
            noise_seed: constants::get_noise_seed(),
            rules: HeuristicRules::default(),
        }
    }

    pub fn with_scorer_timeout(mut self, timeout: Duration) -> Self {
        self.scorer_timeout = timeout;
        self
    }

    pub fn with_noise(mut self, seed: u64) -> Self {
        self.noise_enabled = true;
        self.noise_seed = Some(seed);
        self
    }

    pub fn with_breaker(mut self, failure_threshold: u32, reset: Duration) -> Self {
        self.breaker_failure_threshold = failure_threshold;
        self.breaker_reset = reset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_scoring_contract() {
        let config = EngineConfig::default();
        assert_eq!(config.scorer_timeout, Duration::from_millis(800));
        assert_eq!(config.reputation_ttl, Duration::from_secs(300));
        assert!(!config.noise_enabled);
        assert_eq!(config.breaker_failure_threshold, 0);
    }

    #[test]
    fn test_switches_toggle() {
        let switches = ScoringSwitches::default();
        assert!(switches.is_remote_enabled());

        switches.set_remote(false);
        switches.set_propagation(false);
        let state = switches.snapshot();
        assert!(!state.remote_enabled);
        assert!(!state.propagation_enabled);
    }
}
