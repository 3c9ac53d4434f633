//! Admission gate restricting signals to the evening trading session.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, Offset, TimeZone, Timelike, Utc};

use super::clock::DEFAULT_VENUE_OFFSET_MINUTES;

/// Weekday evening window in the venue's zone.
///
/// Closed all Saturday and Sunday. On weekdays open from `open` to `close`,
/// both inclusive, compared at whole-second resolution (23:59:59.9 counts as
/// 23:59:59).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingWindowGate {
    offset: FixedOffset,
    open: NaiveTime,
    close: NaiveTime,
}

impl Default for TradingWindowGate {
    fn default() -> Self {
        let offset = FixedOffset::east_opt(DEFAULT_VENUE_OFFSET_MINUTES * 60)
            .unwrap_or_else(|| Utc.fix());
        Self::new(offset, hms(18, 0, 0), hms(23, 59, 59))
    }
}

fn hms(hour: i64, min: i64, sec: i64) -> NaiveTime {
    NaiveTime::MIN + Duration::hours(hour) + Duration::minutes(min) + Duration::seconds(sec)
}

impl TradingWindowGate {
    pub fn new(offset: FixedOffset, open: NaiveTime, close: NaiveTime) -> Self {
        Self {
            offset,
            open,
            close,
        }
    }

    /// Default 18:00:00-23:59:59 session in another venue zone.
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Whether signals may fire at `now`. Any zone is accepted; the instant
    /// is converted to venue time before evaluating.
    pub fn is_open<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        let local = now.with_timezone(&self.offset);

        if local.weekday().num_days_from_monday() >= 5 {
            return false;
        }

        let time = local.time().with_nanosecond(0).unwrap_or(local.time());
        self.open <= time && time <= self.close
    }

    /// Human-readable session description for suppression messages.
    pub fn describe(&self) -> String {
        format!(
            "Mon-Fri {}-{} UTC{}",
            self.open.format("%H:%M"),
            self.close.format("%H:%M:%S"),
            self.offset
        )
    }
}
