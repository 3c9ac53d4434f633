//! Daily win-rate rollups over the signal store.

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::services::signal_store::SignalStore;
use crate::types::DailyStats;

/// Longest range `history` will build, in days.
pub const MAX_HISTORY_DAYS: u32 = 90;

/// Computes [`DailyStats`] from committed signals.
pub struct StatsAggregator {
    store: Arc<SignalStore>,
}

impl StatsAggregator {
    pub fn new(store: Arc<SignalStore>) -> Self {
        Self { store }
    }

    /// Stats for one venue-local calendar day.
    pub fn daily(&self, date: NaiveDate) -> Result<DailyStats> {
        let counts = self.store.status_counts(date)?;
        let stats = DailyStats::from_counts(date, counts.total, counts.won, counts.lost);
        debug!(
            "Stats for {}: {} total, {} won, {} lost, {:.2}%",
            date, stats.total, stats.won, stats.lost, stats.win_rate
        );
        Ok(stats)
    }

    /// Stats for the current venue day.
    pub fn today(&self) -> Result<DailyStats> {
        self.daily(self.store.clock().today())
    }

    /// One entry per day for the last `days` venue days, ending today.
    /// Days without signals are included with zero counts.
    pub fn history(&self, days: u32) -> Result<Vec<DailyStats>> {
        if days == 0 || days > MAX_HISTORY_DAYS {
            return Err(AppError::BadRequest(format!(
                "days must be between 1 and {}",
                MAX_HISTORY_DAYS
            )));
        }

        let to = self.store.clock().today();
        let from = to - Duration::days(days as i64 - 1);

        let counts: HashMap<NaiveDate, _> = self
            .store
            .status_counts_between(from, to)?
            .into_iter()
            .collect();

        Ok(from
            .iter_days()
            .take(days as usize)
            .map(|date| match counts.get(&date) {
                Some(c) => DailyStats::from_counts(date, c.total, c.won, c.lost),
                None => DailyStats::empty(date),
            })
            .collect())
    }
}
