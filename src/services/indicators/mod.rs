//! Technical indicator implementations.
//!
//! Everything here is a pure function of its input: no clocks, no shared
//! state. Malformed input (empty series, non-finite prices, zero periods) is
//! an `InvalidSeries` error rather than NaN output.

pub mod ema;
pub mod macd;
pub mod rsi;

pub use ema::Ema;
pub use macd::{crossover, Crossover, Macd, MacdSeries};
pub use rsi::Rsi;

use crate::error::{AppError, Result};
use crate::types::{closes, IndicatorSnapshot, PricePoint};

/// Reject series the indicators cannot be computed over.
pub(crate) fn validate_prices(prices: &[f64]) -> Result<()> {
    if prices.is_empty() {
        return Err(AppError::InvalidSeries("price series is empty".to_string()));
    }
    if let Some(i) = prices.iter().position(|p| !p.is_finite()) {
        return Err(AppError::InvalidSeries(format!(
            "non-finite price at index {}",
            i
        )));
    }
    Ok(())
}

/// RSI over a price series, one value per point.
pub fn compute_rsi(series: &[PricePoint], period: usize) -> Result<Vec<Option<f64>>> {
    Rsi::new(period).compute(&closes(series))
}

/// MACD line and signal line over a price series, one value per point each.
pub fn compute_macd(
    series: &[PricePoint],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<(Vec<Option<f64>>, Vec<Option<f64>>)> {
    let out = Macd::new(fast, slow, signal).compute(&closes(series))?;
    Ok((out.macd, out.signal))
}

/// Bundles the configured indicators into one snapshot per series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorEngine {
    rsi: Rsi,
    macd: Macd,
}

impl IndicatorEngine {
    pub fn new(rsi: Rsi, macd: Macd) -> Self {
        Self { rsi, macd }
    }

    pub fn rsi(&self) -> &Rsi {
        &self.rsi
    }

    pub fn macd(&self) -> &Macd {
        &self.macd
    }

    /// Compute all indicators over raw prices.
    pub fn snapshot(&self, prices: &[f64]) -> Result<IndicatorSnapshot> {
        let rsi = self.rsi.compute(prices)?;
        let macd = self.macd.compute(prices)?;

        Ok(IndicatorSnapshot {
            rsi,
            macd: macd.macd,
            macd_signal: macd.signal,
            last_price: prices.last().copied(),
        })
    }

    /// Compute all indicators over a timestamped series.
    pub fn snapshot_series(&self, series: &[PricePoint]) -> Result<IndicatorSnapshot> {
        self.snapshot(&closes(series))
    }
}
