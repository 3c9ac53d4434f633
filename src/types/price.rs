use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single observed price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    /// Observation time.
    pub timestamp: DateTime<FixedOffset>,
    /// Observed price.
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<FixedOffset>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Extract the raw price column from a chronological series.
pub fn closes(series: &[PricePoint]) -> Vec<f64> {
    series.iter().map(|p| p.price).collect()
}

/// Price as supplied by the caller.
///
/// Webhooks send either a number or a free-form string ("1.0850", "Current").
/// The display text is kept verbatim; the numeric value is present only when
/// the text parses as a finite number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalPrice {
    /// Verbatim text shown in messages and stored in the database.
    pub display: String,
    /// Parsed value, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl SignalPrice {
    /// Build from display text, parsing a numeric value when possible.
    pub fn from_text(text: impl Into<String>) -> Self {
        let display = text.into();
        let value = display
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite());
        Self { display, value }
    }

    /// Build from a numeric value.
    pub fn from_value(value: f64) -> Self {
        Self {
            display: value.to_string(),
            value: Some(value).filter(|v| v.is_finite()),
        }
    }
}

impl Default for SignalPrice {
    fn default() -> Self {
        Self::from_text("Current")
    }
}

impl fmt::Display for SignalPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

/// Price field of an inbound payload: number or string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

impl From<RawPrice> for SignalPrice {
    fn from(raw: RawPrice) -> Self {
        match raw {
            RawPrice::Number(v) => SignalPrice::from_value(v),
            RawPrice::Text(s) => SignalPrice::from_text(s),
        }
    }
}
