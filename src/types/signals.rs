use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::SignalPrice;

/// Direction of a binary signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
}

impl SignalAction {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUY" | "CALL" | "LONG" => Some(Self::Buy),
            "SELL" | "PUT" | "SHORT" => Some(Self::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalAction::Buy => "BUY",
            SignalAction::Sell => "SELL",
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a signal.
///
/// `Pending` is the only initial state; `Won` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalStatus {
    Pending,
    Won,
    Lost,
}

impl SignalStatus {
    /// Parse from string (case-insensitive, accepts WIN/LOSS aliases).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "WON" | "WIN" => Some(Self::Won),
            "LOST" | "LOSS" => Some(Self::Lost),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStatus::Pending => "PENDING",
            SignalStatus::Won => "WON",
            SignalStatus::Lost => "LOST",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SignalStatus::Pending)
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted trading signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    /// Store-assigned id, unique and increasing.
    pub id: i64,
    pub symbol: String,
    pub action: SignalAction,
    /// Price snapshot at signal time.
    pub price: SignalPrice,
    /// Strategy confidence in [0, 1].
    pub confidence: f64,
    /// Creation time in the trading venue's zone.
    pub created_at: DateTime<FixedOffset>,
    pub status: SignalStatus,
    /// Reserved; stored when supplied with a result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_price: Option<f64>,
    /// Set when the status leaves `Pending`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_time: Option<DateTime<FixedOffset>>,
}

/// Win-rate rollup for one venue-local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    /// Every signal created that day, pending included.
    pub total: u32,
    pub won: u32,
    pub lost: u32,
    pub pending: u32,
    /// won / (won + lost) * 100, rounded to 2 decimals; 0 when nothing settled.
    pub win_rate: f64,
}

impl DailyStats {
    /// Build stats from status counts.
    pub fn from_counts(date: NaiveDate, total: u32, won: u32, lost: u32) -> Self {
        let settled = won + lost;
        let win_rate = if settled > 0 {
            round2(won as f64 / settled as f64 * 100.0)
        } else {
            0.0
        };

        Self {
            date,
            total,
            won,
            lost,
            pending: total.saturating_sub(settled),
            win_rate,
        }
    }

    pub fn empty(date: NaiveDate) -> Self {
        Self::from_counts(date, 0, 0, 0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Indicator values aligned index-by-index with a price series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    /// Last price in the series the snapshot was built from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
}

impl IndicatorSnapshot {
    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }

    /// RSI at the last index, if defined.
    pub fn latest_rsi(&self) -> Option<f64> {
        self.rsi.last().copied().flatten()
    }

    /// (macd, signal) at index `i`, if both are defined.
    pub fn macd_at(&self, i: usize) -> Option<(f64, f64)> {
        let macd = self.macd.get(i).copied().flatten()?;
        let signal = self.macd_signal.get(i).copied().flatten()?;
        Some((macd, signal))
    }
}

/// A strategy's proposed signal, before admission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub action: SignalAction,
    /// Always within [0, 1].
    pub confidence: f64,
}

impl Candidate {
    pub fn new(action: SignalAction, confidence: f64) -> Self {
        Self {
            action,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(SignalAction::from_str("buy"), Some(SignalAction::Buy));
        assert_eq!(SignalAction::from_str(" SELL "), Some(SignalAction::Sell));
        assert_eq!(SignalAction::from_str("hold"), None);
    }

    #[test]
    fn test_status_parse_aliases() {
        assert_eq!(SignalStatus::from_str("won"), Some(SignalStatus::Won));
        assert_eq!(SignalStatus::from_str("WIN"), Some(SignalStatus::Won));
        assert_eq!(SignalStatus::from_str("loss"), Some(SignalStatus::Lost));
        assert_eq!(SignalStatus::from_str("draw"), None);
    }

    #[test]
    fn test_status_terminal() {
        assert!(!SignalStatus::Pending.is_terminal());
        assert!(SignalStatus::Won.is_terminal());
        assert!(SignalStatus::Lost.is_terminal());
    }

    #[test]
    fn test_action_serializes_uppercase() {
        let json = serde_json::to_string(&SignalAction::Buy).unwrap();
        assert_eq!(json, "\"BUY\"");
    }

    #[test]
    fn test_daily_stats_excludes_pending_from_win_rate() {
        let stats = DailyStats::from_counts(day(), 3, 1, 1);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.win_rate, 50.0);
    }

    #[test]
    fn test_daily_stats_rounds_to_two_decimals() {
        let stats = DailyStats::from_counts(day(), 3, 2, 1);
        assert_eq!(stats.win_rate, 66.67);
    }

    #[test]
    fn test_daily_stats_nothing_settled() {
        let stats = DailyStats::from_counts(day(), 4, 0, 0);
        assert_eq!(stats.win_rate, 0.0);
        assert_eq!(stats.pending, 4);
        assert_eq!(DailyStats::empty(day()).total, 0);
    }

    #[test]
    fn test_candidate_confidence_clamped() {
        assert_eq!(Candidate::new(SignalAction::Buy, 1.4).confidence, 1.0);
        assert_eq!(Candidate::new(SignalAction::Sell, -0.2).confidence, 0.0);
    }

    #[test]
    fn test_snapshot_accessors() {
        let snapshot = IndicatorSnapshot {
            rsi: vec![None, Some(42.0)],
            macd: vec![Some(0.1), Some(0.2)],
            macd_signal: vec![Some(0.05), None],
            last_price: Some(1.1),
        };

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.latest_rsi(), Some(42.0));
        assert_eq!(snapshot.macd_at(0), Some((0.1, 0.05)));
        assert_eq!(snapshot.macd_at(1), None);
        assert!(IndicatorSnapshot::default().is_empty());
    }
}
