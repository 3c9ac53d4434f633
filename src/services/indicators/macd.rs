//! MACD (Moving Average Convergence Divergence) indicator.

use super::ema::Ema;
use crate::error::{AppError, Result};

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
/// - Histogram = MACD Line - Signal Line
///
/// Buy signal: MACD crosses above signal line
/// Sell signal: MACD crosses below signal line
///
/// All EMAs are seeded with their first input, so both lines are defined
/// from index 0. Because only EMA differences are taken, the MACD line does
/// not depend on the absolute price level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// Direction of a MACD / signal-line cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossover {
    /// MACD moved from at-or-below to above the signal line.
    Bullish,
    /// MACD moved from at-or-above to below the signal line.
    Bearish,
}

/// Output of a MACD calculation, aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

/// Detect a cross between `i - 1` and `i` from paired (macd, signal) values.
pub fn crossover(prev: (f64, f64), curr: (f64, f64)) -> Option<Crossover> {
    let (prev_macd, prev_signal) = prev;
    let (macd, signal) = curr;

    if prev_macd <= prev_signal && macd > signal {
        Some(Crossover::Bullish)
    } else if prev_macd >= prev_signal && macd < signal {
        Some(Crossover::Bearish)
    } else {
        None
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }

    /// History length after which the slow EMA and the signal line have both
    /// seen a full span of data.
    pub fn min_periods(&self) -> usize {
        self.slow_period + self.signal_period
    }

    /// MACD and signal lines for every index of `prices`.
    pub fn compute(&self, prices: &[f64]) -> Result<MacdSeries> {
        if self.fast_period >= self.slow_period {
            return Err(AppError::InvalidSeries(format!(
                "MACD fast span {} must be shorter than slow span {}",
                self.fast_period, self.slow_period
            )));
        }

        let fast = Ema::new(self.fast_period).compute(prices)?;
        let slow = Ema::new(self.slow_period).compute(prices)?;

        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = Ema::new(self.signal_period).compute(&macd)?;

        Ok(MacdSeries {
            macd: macd.into_iter().map(Some).collect(),
            signal: signal.into_iter().map(Some).collect(),
        })
    }
}
