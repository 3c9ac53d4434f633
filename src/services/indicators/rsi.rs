//! Relative Strength Index (RSI) indicator.

use super::validate_prices;
use crate::error::{AppError, Result};

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of recent gains to recent losses.
/// Values range from 0-100:
/// - Below 30: Oversold (potential buy signal)
/// - Above 70: Overbought (potential sell signal)
///
/// Averages are plain rolling means over the trailing `period` price changes
/// (not Wilder smoothing). Index `i` is defined only when a full window of
/// changes ending at `i` exists, i.e. `i >= period`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Points needed before the first defined value.
    pub fn min_periods(&self) -> usize {
        self.period + 1
    }

    /// RSI for every index of `prices`.
    pub fn compute(&self, prices: &[f64]) -> Result<Vec<Option<f64>>> {
        if self.period == 0 {
            return Err(AppError::InvalidSeries("RSI period must be at least 1".to_string()));
        }
        validate_prices(prices)?;

        let mut gains = vec![0.0; prices.len()];
        let mut losses = vec![0.0; prices.len()];
        for i in 1..prices.len() {
            let change = prices[i] - prices[i - 1];
            if change > 0.0 {
                gains[i] = change;
            } else if change < 0.0 {
                losses[i] = -change;
            }
        }

        let mut out = vec![None; prices.len()];
        for i in self.period..prices.len() {
            // Summed per window so a flat run yields an exact zero.
            let window = i + 1 - self.period..=i;
            let avg_gain = gains[window.clone()].iter().sum::<f64>() / self.period as f64;
            let avg_loss = losses[window].iter().sum::<f64>() / self.period as f64;
            out[i] = Self::rsi_value(avg_gain, avg_loss);
        }

        Ok(out)
    }

    fn rsi_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
        if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                // No movement at all: neither overbought nor oversold.
                return None;
            }
            return Some(100.0);
        }

        let rs = avg_gain / avg_loss;
        Some(100.0 - (100.0 / (1.0 + rs)))
    }
}
