//! Exponential Moving Average (EMA).

use super::validate_prices;
use crate::error::{AppError, Result};

/// EMA (Exponential Moving Average).
///
/// Smoothing factor α = 2 / (span + 1). The average is seeded with the first
/// value, so every index has a value:
///
/// ```text
/// ema[0] = x[0]
/// ema[i] = α·x[i] + (1 − α)·ema[i−1]
/// ```
///
/// Early values lean heavily on the seed and are approximations until roughly
/// `span` points have been seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    span: usize,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        Self { span }
    }

    pub fn span(&self) -> usize {
        self.span
    }

    /// Smoothing factor.
    pub fn alpha(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }

    /// EMA of `values`, one output per input.
    pub fn compute(&self, values: &[f64]) -> Result<Vec<f64>> {
        if self.span == 0 {
            return Err(AppError::InvalidSeries("EMA span must be at least 1".to_string()));
        }
        validate_prices(values)?;

        let alpha = self.alpha();
        let mut ema = Vec::with_capacity(values.len());
        let mut prev = values[0];
        ema.push(prev);

        for value in &values[1..] {
            prev = alpha * value + (1.0 - alpha) * prev;
            ema.push(prev);
        }

        Ok(ema)
    }
}
