//! Circuit Breaker - optional guard in front of the remote scorer
//!
//! Disabled when `failure_threshold == 0`: every transaction then attempts
//! the remote call independently.
//!
//! # States
//!
//! - **Closed**: calls pass through
//! - **Open**: `failure_threshold` consecutive failures seen, calls are
//!   skipped until `reset` has elapsed
//! - **HalfOpen**: one trial call is let through; success closes, failure
//!   reopens, a cancelled trial frees the slot for the next caller

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitState {
    #[default]
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Default)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    reset: Duration,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, reset: Duration) -> Self {
        Self {
            failure_threshold,
            reset,
            inner: Mutex::new(BreakerInner::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.failure_threshold > 0
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Ask to place one remote call.
    ///
    /// `None` means the circuit is open. The returned permit must be settled
    /// with [`BreakerPermit::success`] or [`BreakerPermit::failure`]; a permit
    /// dropped unsettled (the caller was cancelled mid-call) gives a
    /// half-open trial slot back instead of holding it forever.
    pub fn try_acquire(&self) -> Option<BreakerPermit<'_>> {
        if !self.is_enabled() {
            return Some(BreakerPermit::new(self, false));
        }

        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => Some(BreakerPermit::new(self, false)),
            CircuitState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or(self.reset);
                if elapsed >= self.reset {
                    inner.state = CircuitState::HalfOpen;
                    inner.trial_in_flight = true;
                    log::info!("[SCORER] Circuit half-open, sending trial request");
                    Some(BreakerPermit::new(self, true))
                } else {
                    None
                }
            }
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    None
                } else {
                    inner.trial_in_flight = true;
                    Some(BreakerPermit::new(self, true))
                }
            }
        }
    }

    fn record_success(&self) {
        if !self.is_enabled() {
            return;
        }

        let mut inner = self.inner.lock();
        if inner.state != CircuitState::Closed {
            log::info!("[SCORER] Circuit closed, remote scorer recovered");
        }
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
        inner.trial_in_flight = false;
    }

    fn record_failure(&self) {
        if !self.is_enabled() {
            return;
        }

        let mut inner = self.inner.lock();
        inner.consecutive_failures += 1;
        inner.trial_in_flight = false;

        let trip = inner.state == CircuitState::HalfOpen
            || inner.consecutive_failures >= self.failure_threshold;
        if trip && inner.state != CircuitState::Open {
            log::warn!(
                "[SCORER] Circuit opened after {} consecutive failures",
                inner.consecutive_failures
            );
        }
        if trip {
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
        }
    }

    fn release_trial(&self) {
        let mut inner = self.inner.lock();
        if inner.state == CircuitState::HalfOpen && inner.trial_in_flight {
            inner.trial_in_flight = false;
            log::debug!("[SCORER] Half-open trial abandoned, slot released");
        }
    }
}

/// One admitted remote call
#[must_use = "settle the permit with success() or failure()"]
pub struct BreakerPermit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    settled: bool,
}

impl<'a> BreakerPermit<'a> {
    fn new(breaker: &'a CircuitBreaker, trial: bool) -> Self {
        Self { breaker, trial, settled: false }
    }

    /// Whether this permit holds the half-open trial slot
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    pub fn success(mut self) {
        self.settled = true;
        self.breaker.record_success();
    }

    pub fn failure(mut self) {
        self.settled = true;
        self.breaker.record_failure();
    }
}

impl Drop for BreakerPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            self.breaker.release_trial();
        }
    }
}
