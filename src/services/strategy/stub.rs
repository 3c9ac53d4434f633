//! Random demo strategy.
//!
//! NOT PREDICTIVE. Ignores market data entirely; it exists so the pipeline
//! can be exercised end to end without a price feed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::sync::Mutex;

use super::SignalStrategy;
use crate::types::{Candidate, IndicatorSnapshot, SignalAction};

/// Share of calls that produce a candidate.
const HIT_RATE: f64 = 0.8;
const CONFIDENCE_RANGE: RangeInclusive<f64> = 0.75..=0.95;

/// Random BUY/SELL with confidence drawn uniformly from [0.75, 0.95],
/// 80% of the time; nothing otherwise.
pub struct StubStrategy {
    rng: Mutex<StdRng>,
}

impl StubStrategy {
    /// Entropy-seeded.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for StubStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalStrategy for StubStrategy {
    fn name(&self) -> &str {
        "stub"
    }

    fn is_predictive(&self) -> bool {
        false
    }

    fn generate(&self, _symbol: &str, _snapshot: &IndicatorSnapshot) -> Option<Candidate> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        if !rng.gen_bool(HIT_RATE) {
            return None;
        }

        let action = if rng.gen_bool(0.5) {
            SignalAction::Buy
        } else {
            SignalAction::Sell
        };
        let confidence = rng.gen_range(CONFIDENCE_RANGE);

        Some(Candidate::new(action, confidence))
    }
}
