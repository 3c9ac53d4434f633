use std::env;

use crate::services::signal_store::ResultPolicy;
use crate::services::strategy::StrategyKind;

/// Telegram delivery configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather.
    pub bot_token: String,
    /// Chat (or channel) receiving the messages.
    pub chat_id: String,
    /// Bot API base URL.
    pub api_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

/// Thresholds for the indicator-based strategy.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    /// Which decision policy to run.
    pub kind: StrategyKind,
    /// RSI level below which the market is considered oversold.
    pub rsi_oversold: f64,
    /// RSI level above which the market is considered overbought.
    pub rsi_overbought: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            kind: StrategyKind::IndicatorBased,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Path of the SQLite signals database.
    pub database_path: String,
    /// Telegram delivery (None = log-only notifications).
    pub telegram: Option<TelegramConfig>,
    /// Decision policy settings.
    pub strategy: StrategyConfig,
    /// Max price points kept per symbol for indicator calculations.
    pub history_capacity: usize,
    /// Trading venue offset from UTC, in minutes (Colombo = +330).
    pub venue_utc_offset_minutes: i32,
    /// What to do when a result is posted for an already settled signal.
    pub result_policy: ResultPolicy,
    /// Bearer token guarding the admin endpoints (None = open).
    pub admin_token: Option<String>,
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env_opt(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let telegram = match (env_opt("TELEGRAM_BOT_TOKEN"), env_opt("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat_id,
                api_url: env_opt("TELEGRAM_API_URL")
                    .unwrap_or_else(|| "https://api.telegram.org".to_string()),
                timeout_ms: env_parse("NOTIFY_TIMEOUT_MS", 10_000),
            }),
            _ => None,
        };

        let defaults = StrategyConfig::default();

        Self {
            host: env_opt("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_parse("PORT", 5000),
            database_path: env_opt("DATABASE_PATH")
                .unwrap_or_else(|| "trading_signals.db".to_string()),
            telegram,
            strategy: StrategyConfig {
                kind: env_opt("STRATEGY")
                    .and_then(|s| StrategyKind::from_str(&s))
                    .unwrap_or(defaults.kind),
                rsi_oversold: env_parse("RSI_OVERSOLD", defaults.rsi_oversold),
                rsi_overbought: env_parse("RSI_OVERBOUGHT", defaults.rsi_overbought),
            },
            history_capacity: env_parse("HISTORY_CAPACITY", 500),
            venue_utc_offset_minutes: env_parse("VENUE_UTC_OFFSET_MINUTES", 330),
            result_policy: env_opt("RESULT_POLICY")
                .and_then(|s| ResultPolicy::from_str(&s))
                .unwrap_or_default(),
            admin_token: env_opt("ADMIN_TOKEN"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_path: "trading_signals.db".to_string(),
            telegram: None,
            strategy: StrategyConfig::default(),
            history_capacity: 500,
            venue_utc_offset_minutes: 330,
            result_policy: ResultPolicy::default(),
            admin_token: None,
        }
    }
}
