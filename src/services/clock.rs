//! Injected time source and the trading venue's zone.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};
use std::sync::{Arc, Mutex};

use crate::error::{AppError, Result};

/// Colombo is UTC+05:30 all year round.
pub const DEFAULT_VENUE_OFFSET_MINUTES: i32 = 330;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    /// Build from an RFC 3339 string, e.g. `2024-06-04T20:00:00+05:30`.
    pub fn at(rfc3339: &str) -> Result<Arc<Self>> {
        let instant = DateTime::parse_from_rfc3339(rfc3339)
            .map_err(|e| AppError::BadRequest(format!("invalid timestamp {}: {}", rfc3339, e)))?;
        Ok(Self::new(instant.with_timezone(&Utc)))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Build the venue offset from minutes east of UTC.
pub fn venue_offset(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| AppError::Internal(format!("invalid venue UTC offset: {} minutes", minutes)))
}

/// A clock that reports time in the trading venue's zone.
#[derive(Clone)]
pub struct VenueClock {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl VenueClock {
    pub fn new(clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self { clock, offset }
    }

    /// System clock in the default (Colombo) zone.
    pub fn system() -> Self {
        let offset =
            FixedOffset::east_opt(DEFAULT_VENUE_OFFSET_MINUTES * 60).unwrap_or_else(|| Utc.fix());
        Self::new(Arc::new(SystemClock), offset)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Current venue-local time.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.offset)
    }

    /// Current venue-local calendar date.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

impl std::fmt::Debug for VenueClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VenueClock")
            .field("offset", &self.offset)
            .finish()
    }
}
