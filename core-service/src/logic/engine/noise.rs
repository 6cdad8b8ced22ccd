//! Noise Source - injectable randomness for the fallback heuristics
//!
//! The probability-gated rules model background false positives. They only
//! run when the engine is given a `NoiseSource`; without one the fallback
//! path is fully deterministic.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait NoiseSource: Send {
    /// Returns true with the given probability
    fn roll(&mut self, probability: f64) -> bool;
}

/// `StdRng`-backed source; reproducible when seeded
pub struct SeededNoise {
    rng: StdRng,
}

impl SeededNoise {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl NoiseSource for SeededNoise {
    fn roll(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }
}
