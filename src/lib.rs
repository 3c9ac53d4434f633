//! Binary Signals - evening-window trading signal service.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod types;

use std::sync::Arc;
use tracing::info;

use config::Config;
use services::clock::venue_offset;
use services::{
    IndicatorEngine, LogNotifier, Notifier, PriceHistory, SignalPipeline, SignalStore,
    StrategyKind, SystemClock, TelegramNotifier, TradingWindowGate, VenueClock,
};

pub use error::{AppError, Result};
pub use types::*;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<SignalPipeline>,
}

impl AppState {
    pub fn new(config: Config, pipeline: SignalPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
        }
    }

    /// Wire the production components from configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let offset = venue_offset(config.venue_utc_offset_minutes)?;
        let clock = VenueClock::new(Arc::new(SystemClock), offset);

        let store = SignalStore::open(&config.database_path, clock.clone())?
            .with_policy(config.result_policy);
        let existing = store.count()?;
        info!(
            "Signal store at {} ({} signals, {:?} policy)",
            config.database_path,
            existing,
            store.policy()
        );

        let engine = IndicatorEngine::default();
        let strategy = StrategyKind::build(&config.strategy, &engine);
        info!("Using '{}' strategy", strategy.name());

        let notifier: Arc<dyn Notifier> = match &config.telegram {
            Some(telegram) => {
                info!("Telegram notifications enabled for chat {}", telegram.chat_id);
                Arc::new(TelegramNotifier::new(telegram.clone())?)
            }
            None => {
                info!("Telegram not configured - notifications go to the log");
                Arc::new(LogNotifier)
            }
        };

        let pipeline = SignalPipeline::new(
            TradingWindowGate::with_offset(offset),
            clock,
            PriceHistory::new(config.history_capacity),
            engine,
            strategy,
            Arc::new(store),
            notifier,
        );

        Ok(Self::new(config, pipeline))
    }
}
