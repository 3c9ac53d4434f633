//! Inbound payloads and their validated forms.

use serde::{Deserialize, Serialize};

use super::{RawPrice, SignalAction, SignalPrice, SignalStatus};
use crate::error::AppError;

/// Symbol used when a webhook omits one.
pub const DEFAULT_SYMBOL: &str = "EURUSD";

/// Longest symbol accepted from a webhook.
pub const MAX_SYMBOL_LEN: usize = 32;

/// Ticker characters: ASCII alphanumerics plus the separators charting
/// tools put in symbols (`FX:EURUSD`, `BTC/USD`, `EUR_USD`).
fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/' | ':' | '!')
}

/// Webhook body as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    pub symbol: Option<String>,
    #[serde(alias = "action_hint")]
    pub action: Option<String>,
    pub price: Option<RawPrice>,
}

/// A validated inbound event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalEvent {
    pub symbol: String,
    pub action_hint: SignalAction,
    pub price: SignalPrice,
}

impl SignalEvent {
    pub fn new(symbol: &str, action_hint: SignalAction, price: SignalPrice) -> Self {
        Self {
            symbol: symbol.trim().to_string(),
            action_hint,
            price,
        }
    }
}

impl TryFrom<WebhookPayload> for SignalEvent {
    type Error = AppError;

    fn try_from(payload: WebhookPayload) -> Result<Self, Self::Error> {
        let symbol = payload
            .symbol
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string());
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            return Err(AppError::BadRequest("symbol must not be empty".to_string()));
        }
        if trimmed.len() > MAX_SYMBOL_LEN {
            return Err(AppError::BadRequest(format!(
                "symbol longer than {} characters",
                MAX_SYMBOL_LEN
            )));
        }
        if !trimmed.chars().all(is_symbol_char) {
            return Err(AppError::BadRequest(format!("invalid symbol: {}", trimmed)));
        }

        let action_hint = match payload.action {
            Some(raw) => SignalAction::from_str(&raw)
                .ok_or_else(|| AppError::BadRequest(format!("unknown action: {}", raw)))?,
            None => SignalAction::Buy,
        };

        let price = payload.price.map(SignalPrice::from).unwrap_or_default();

        Ok(SignalEvent::new(&symbol, action_hint, price))
    }
}

/// Result update body as received.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultPayload {
    pub signal_id: i64,
    pub status: String,
    #[serde(default)]
    pub result_price: Option<f64>,
}

/// A validated result update. `status` is always terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultUpdate {
    pub signal_id: i64,
    pub status: SignalStatus,
    pub result_price: Option<f64>,
}

impl TryFrom<ResultPayload> for ResultUpdate {
    type Error = AppError;

    fn try_from(payload: ResultPayload) -> Result<Self, Self::Error> {
        let status = SignalStatus::from_str(&payload.status)
            .filter(|s| s.is_terminal())
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "status must be WON or LOST, got {}",
                    payload.status
                ))
            })?;

        Ok(Self {
            signal_id: payload.signal_id,
            status,
            result_price: payload.result_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_uses_defaults() {
        let event = SignalEvent::try_from(WebhookPayload::default()).unwrap();
        assert_eq!(event.symbol, "EURUSD");
        assert_eq!(event.action_hint, SignalAction::Buy);
        assert_eq!(event.price.display, "Current");
        assert_eq!(event.price.value, None);
    }

    #[test]
    fn test_payload_with_numeric_price() {
        let payload: WebhookPayload =
            serde_json::from_str(r#"{"symbol":"gbpusd","action":"sell","price":1.2712}"#).unwrap();
        let event = SignalEvent::try_from(payload).unwrap();

        assert_eq!(event.symbol, "gbpusd");
        assert_eq!(event.action_hint, SignalAction::Sell);
        assert_eq!(event.price.value, Some(1.2712));
    }

    #[test]
    fn test_payload_accepts_action_hint_alias() {
        let payload: WebhookPayload =
            serde_json::from_str(r#"{"action_hint":"SELL","price":"1.0850"}"#).unwrap();
        let event = SignalEvent::try_from(payload).unwrap();
        assert_eq!(event.action_hint, SignalAction::Sell);
        assert_eq!(event.price.display, "1.0850");
    }

    #[test]
    fn test_payload_rejects_unknown_action() {
        let payload = WebhookPayload {
            action: Some("HODL".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            SignalEvent::try_from(payload),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_payload_rejects_blank_symbol() {
        let payload = WebhookPayload {
            symbol: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(SignalEvent::try_from(payload).is_err());
    }

    #[test]
    fn test_payload_symbol_kept_as_given() {
        for raw in ["EurUsd", " FX:EURUSD ", "BTC/USD", "EUR_USD", "ES1!"] {
            let payload = WebhookPayload {
                symbol: Some(raw.to_string()),
                ..Default::default()
            };
            let event = SignalEvent::try_from(payload).unwrap();
            assert_eq!(event.symbol, raw.trim());
        }
    }

    #[test]
    fn test_payload_rejects_oversized_or_odd_symbol() {
        let too_long = "X".repeat(MAX_SYMBOL_LEN + 1);
        let at_limit = "X".repeat(MAX_SYMBOL_LEN);
        for raw in [too_long.as_str(), "EUR USD", "<script>", "EUR\nUSD", "€USD"] {
            let payload = WebhookPayload {
                symbol: Some(raw.to_string()),
                ..Default::default()
            };
            assert!(
                matches!(SignalEvent::try_from(payload), Err(AppError::BadRequest(_))),
                "accepted {:?}",
                raw
            );
        }

        let payload = WebhookPayload {
            symbol: Some(at_limit.clone()),
            ..Default::default()
        };
        assert_eq!(SignalEvent::try_from(payload).unwrap().symbol, at_limit);
    }

    #[test]
    fn test_result_update_requires_terminal_status() {
        let pending = ResultPayload {
            signal_id: 1,
            status: "PENDING".to_string(),
            result_price: None,
        };
        assert!(ResultUpdate::try_from(pending).is_err());

        let won = ResultPayload {
            signal_id: 1,
            status: "win".to_string(),
            result_price: Some(1.09),
        };
        let update = ResultUpdate::try_from(won).unwrap();
        assert_eq!(update.status, SignalStatus::Won);
        assert_eq!(update.result_price, Some(1.09));
    }
}
