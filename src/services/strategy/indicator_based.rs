//! RSI + MACD crossover strategy.

use tracing::debug;

use super::SignalStrategy;
use crate::services::indicators::{crossover, Crossover, IndicatorEngine};
use crate::types::{Candidate, IndicatorSnapshot, SignalAction};

/// Confidence at the threshold itself; grows toward 1.0 as RSI goes deeper
/// into the extreme zone.
const BASE_CONFIDENCE: f64 = 0.7;

/// Emits BUY when RSI is oversold and MACD has just crossed above its
/// signal line, SELL when RSI is overbought and MACD has just crossed below.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorStrategy {
    oversold: f64,
    overbought: f64,
    /// Snapshots shorter than this are ignored: the slow EMA and the signal
    /// line are still dominated by their seed value.
    min_history: usize,
}

impl IndicatorStrategy {
    pub fn new(oversold: f64, overbought: f64, engine: &IndicatorEngine) -> Self {
        Self {
            oversold,
            overbought,
            min_history: engine.macd().min_periods().max(engine.rsi().min_periods()),
        }
    }

    pub fn min_history(&self) -> usize {
        self.min_history
    }

    fn buy_confidence(&self, rsi: f64) -> f64 {
        let depth = (self.oversold - rsi) / self.oversold;
        BASE_CONFIDENCE + (1.0 - BASE_CONFIDENCE) * depth
    }

    fn sell_confidence(&self, rsi: f64) -> f64 {
        let depth = (rsi - self.overbought) / (100.0 - self.overbought);
        BASE_CONFIDENCE + (1.0 - BASE_CONFIDENCE) * depth
    }
}

impl SignalStrategy for IndicatorStrategy {
    fn name(&self) -> &str {
        "indicator"
    }

    fn generate(&self, symbol: &str, snapshot: &IndicatorSnapshot) -> Option<Candidate> {
        let n = snapshot.len();
        if n < self.min_history.max(2) {
            debug!(
                "{}: {} points of history, need {} - no signal",
                symbol, n, self.min_history
            );
            return None;
        }

        let rsi = snapshot.latest_rsi()?;
        let cross = crossover(snapshot.macd_at(n - 2)?, snapshot.macd_at(n - 1)?)?;

        let candidate = match cross {
            Crossover::Bullish if rsi < self.oversold => {
                Candidate::new(SignalAction::Buy, self.buy_confidence(rsi))
            }
            Crossover::Bearish if rsi > self.overbought => {
                Candidate::new(SignalAction::Sell, self.sell_confidence(rsi))
            }
            _ => {
                debug!("{}: {:?} crossover with RSI {:.1} - no signal", symbol, cross, rsi);
                return None;
            }
        };

        debug!(
            "{}: {} (RSI {:.1}, {:?} crossover, confidence {:.2})",
            symbol, candidate.action, rsi, cross, candidate.confidence
        );
        Some(candidate)
    }
}
