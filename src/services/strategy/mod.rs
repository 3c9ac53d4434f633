//! Decision policies turning indicator output into a candidate signal.

pub mod indicator_based;
pub mod stub;

pub use indicator_based::IndicatorStrategy;
pub use stub::StubStrategy;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::StrategyConfig;
use crate::services::indicators::IndicatorEngine;
use crate::types::{Candidate, IndicatorSnapshot};

/// Core trait every decision policy implements.
///
/// "No signal" is `None`, never a zero-confidence candidate. Confidence of a
/// returned candidate is always within [0, 1].
pub trait SignalStrategy: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Whether the output is derived from market data at all.
    fn is_predictive(&self) -> bool {
        true
    }

    /// Propose a signal for `symbol`, or nothing.
    fn generate(&self, symbol: &str, snapshot: &IndicatorSnapshot) -> Option<Candidate>;
}

/// Selectable strategy variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// RSI extremes confirmed by a MACD crossover.
    IndicatorBased,
    /// Random demo signals. Not predictive.
    Stub,
}

impl StrategyKind {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "indicator" | "indicators" | "indicator_based" => Some(Self::IndicatorBased),
            "stub" | "random" | "demo" => Some(Self::Stub),
            _ => None,
        }
    }

    /// Instantiate the configured strategy.
    pub fn build(config: &StrategyConfig, engine: &IndicatorEngine) -> Arc<dyn SignalStrategy> {
        match config.kind {
            StrategyKind::IndicatorBased => Arc::new(IndicatorStrategy::new(
                config.rsi_oversold,
                config.rsi_overbought,
                engine,
            )),
            StrategyKind::Stub => Arc::new(StubStrategy::new()),
        }
    }
}

/// Always answers with the same candidate. For replays and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedStrategy {
    candidate: Option<Candidate>,
}

impl FixedStrategy {
    pub fn new(candidate: Option<Candidate>) -> Self {
        Self { candidate }
    }
}

impl SignalStrategy for FixedStrategy {
    fn name(&self) -> &str {
        "fixed"
    }

    fn is_predictive(&self) -> bool {
        false
    }

    fn generate(&self, _symbol: &str, _snapshot: &IndicatorSnapshot) -> Option<Candidate> {
        self.candidate
    }
}
