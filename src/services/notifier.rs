//! Outbound chat notifications.
//!
//! Delivery is best effort: callers log failures and carry on. A committed
//! signal is never undone because a message could not be sent.

use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::TelegramConfig;
use crate::error::{AppError, Result};
use crate::types::{DailyStats, SignalAction, SignalStatus};

/// Something worth telling the chat about.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// A strategy signal passed every gate and was stored.
    SignalEmitted {
        id: i64,
        symbol: String,
        action: SignalAction,
        confidence: f64,
        at: DateTime<FixedOffset>,
        window: String,
    },
    /// A manual test signal was stored.
    TestSignal {
        id: i64,
        symbol: String,
        action: SignalAction,
        at: DateTime<FixedOffset>,
    },
    /// A result was recorded; carries the day's stats after the update.
    ResultRecorded {
        id: i64,
        status: SignalStatus,
        stats: DailyStats,
    },
}

impl OutboundMessage {
    /// Telegram Markdown body.
    pub fn render(&self) -> String {
        match self {
            OutboundMessage::SignalEmitted {
                id,
                symbol,
                action,
                confidence,
                at,
                window,
            } => format!(
                "🚀 *HIGH ACCURACY SIGNAL*\n\n\
                 🎯 *Signal ID*: #{}\n\
                 ⏰ *Time*: {}\n\
                 📊 *Symbol*: {}\n\
                 🎯 *Action*: {}\n\
                 ⭐ *Confidence*: {:.1}%\n\n\
                 ⚡ *Trading Hours*: {}\n\
                 ⚠️ *Risk*: Max 2% per trade",
                id,
                at.format("%Y-%m-%d %H:%M:%S"),
                symbol,
                action,
                confidence * 100.0,
                window
            ),
            OutboundMessage::TestSignal {
                id,
                symbol,
                action,
                at,
            } => format!(
                "✅ *TEST SIGNAL WORKING*\n\n\
                 🎯 Signal ID: #{}\n\
                 📊 Symbol: {}\n\
                 🎯 Action: {}\n\
                 ⏰ Time: {}",
                id,
                symbol,
                action,
                at.format("%H:%M:%S")
            ),
            OutboundMessage::ResultRecorded { id, status, stats } => {
                let (emoji, closing) = match status {
                    SignalStatus::Won => ("💰", "🎉 Congratulations!"),
                    _ => ("📉", "💪 Next trade!"),
                };
                format!(
                    "{} *TRADE RESULT*\n\n\
                     📊 *Signal*: #{}\n\
                     🏆 *Result*: {}\n\n\
                     📈 *Today's Stats*:\n\
                     ✅ Won: {}\n\
                     ❌ Lost: {}\n\
                     ⏳ Pending: {}\n\
                     🎯 Win Rate: {}%\n\n\
                     {}",
                    emoji, id, status, stats.won, stats.lost, stats.pending, stats.win_rate, closing
                )
            }
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::SignalEmitted { .. } => "signal",
            OutboundMessage::TestSignal { .. } => "test_signal",
            OutboundMessage::ResultRecorded { .. } => "result",
        }
    }
}

/// Chat delivery capability.
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver one message.
    fn send<'a>(
        &'a self,
        message: &'a OutboundMessage,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

// =============================================================================
// Telegram
// =============================================================================

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages through the Telegram Bot API.
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send<'a>(
        &'a self,
        message: &'a OutboundMessage,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let text = message.render();
            let body = SendMessageRequest {
                chat_id: &self.config.chat_id,
                text: &text,
                parse_mode: "Markdown",
            };

            let response = self.client.post(self.endpoint()).json(&body).send().await?;
            let status = response.status();
            let reply: TelegramResponse = response.json().await?;

            if !status.is_success() || !reply.ok {
                return Err(AppError::Notifier(format!(
                    "Telegram returned {}: {}",
                    status,
                    reply.description.unwrap_or_else(|| "no description".to_string())
                )));
            }

            debug!("Delivered {} message to Telegram", message.kind());
            Ok(())
        })
    }
}

// =============================================================================
// Local notifiers
// =============================================================================

/// Writes messages to the log. Used when Telegram is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn send<'a>(
        &'a self,
        message: &'a OutboundMessage,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            info!("[{}] {}", message.kind(), message.render().replace('\n', " | "));
            Ok(())
        })
    }
}

/// Keeps every message in memory, optionally failing each delivery.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<OutboundMessage>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the message, then reports a delivery failure.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    fn send<'a>(
        &'a self,
        message: &'a OutboundMessage,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.sent
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(message.clone());

            if self.fail {
                return Err(AppError::Notifier("delivery disabled".to_string()));
            }
            Ok(())
        })
    }
}
