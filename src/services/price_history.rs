//! Per-symbol rolling price buffer fed by inbound events.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::warn;

use crate::error::Result;
use crate::services::indicators::IndicatorEngine;
use crate::types::{IndicatorSnapshot, PricePoint};

/// Default cap on distinct symbols held in memory.
pub const MAX_TRACKED_SYMBOLS: usize = 256;

/// Bounded, chronological price series per symbol.
pub struct PriceHistory {
    data: DashMap<String, VecDeque<PricePoint>>,
    capacity: usize,
    max_symbols: usize,
}

impl PriceHistory {
    /// Create a new history keeping at most `capacity` points per symbol.
    pub fn new(capacity: usize) -> Arc<Self> {
        Self::with_limits(capacity, MAX_TRACKED_SYMBOLS)
    }

    /// Like [`PriceHistory::new`], also capping the number of symbols.
    pub fn with_limits(capacity: usize, max_symbols: usize) -> Arc<Self> {
        Arc::new(Self {
            data: DashMap::new(),
            capacity: capacity.max(1),
            max_symbols: max_symbols.max(1),
        })
    }

    /// Append a point, dropping the oldest once over capacity. Points for a
    /// new symbol are dropped once `max_symbols` symbols are tracked.
    pub fn record(&self, symbol: &str, point: PricePoint) {
        if !self.data.contains_key(symbol) && self.data.len() >= self.max_symbols {
            warn!(
                "Tracking {} symbols already - ignoring price for {}",
                self.max_symbols, symbol
            );
            return;
        }

        let mut entry = self.data.entry(symbol.to_string()).or_default();
        let series = entry.value_mut();

        series.push_back(point);
        while series.len() > self.capacity {
            series.pop_front();
        }
    }

    /// Copy of the stored series, oldest first.
    pub fn series(&self, symbol: &str) -> Vec<PricePoint> {
        self.data
            .get(symbol)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, symbol: &str) -> usize {
        self.data
            .get(symbol)
            .map(|s| s.len())
            .unwrap_or(0)
    }

    /// Indicators over the stored series. No history is an empty snapshot,
    /// not an error.
    pub fn snapshot(&self, symbol: &str, engine: &IndicatorEngine) -> Result<IndicatorSnapshot> {
        let series = self.series(symbol);
        if series.is_empty() {
            return Ok(IndicatorSnapshot::default());
        }
        engine.snapshot_series(&series)
    }
}
