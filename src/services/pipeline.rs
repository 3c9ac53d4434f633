//! Event → signal orchestration.
//!
//! Gate, indicators, strategy, store and notifier in that order. The only
//! side effects happen after a candidate clears the confidence floor.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::services::clock::VenueClock;
use crate::services::indicators::IndicatorEngine;
use crate::services::notifier::{Notifier, OutboundMessage};
use crate::services::price_history::PriceHistory;
use crate::services::signal_store::SignalStore;
use crate::services::stats::StatsAggregator;
use crate::services::strategy::SignalStrategy;
use crate::services::trading_window::TradingWindowGate;
use crate::types::{
    DailyStats, PricePoint, ResultUpdate, SignalAction, SignalEvent, SignalPrice,
};

/// Candidates must be strictly above this to be emitted.
pub const CONFIDENCE_FLOOR: f64 = 0.75;

const TEST_SYMBOL: &str = "EURUSD";
const TEST_PRICE: &str = "1.0850";

/// Why an event produced no signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    OutsideWindow,
    LowConfidence,
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuppressReason::OutsideWindow => "outside_window",
            SuppressReason::LowConfidence => "low_confidence",
        }
    }
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Emitted {
        id: i64,
        action: SignalAction,
        confidence: f64,
    },
    Suppressed {
        reason: SuppressReason,
    },
}

/// Wires the signal components together.
pub struct SignalPipeline {
    gate: TradingWindowGate,
    clock: VenueClock,
    history: Arc<PriceHistory>,
    engine: IndicatorEngine,
    strategy: Arc<dyn SignalStrategy>,
    store: Arc<SignalStore>,
    stats: StatsAggregator,
    notifier: Arc<dyn Notifier>,
}

impl SignalPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gate: TradingWindowGate,
        clock: VenueClock,
        history: Arc<PriceHistory>,
        engine: IndicatorEngine,
        strategy: Arc<dyn SignalStrategy>,
        store: Arc<SignalStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        if !strategy.is_predictive() {
            warn!(
                "Strategy '{}' is NOT predictive - signals are for demonstration only",
                strategy.name()
            );
        }

        Self {
            gate,
            clock,
            history,
            engine,
            strategy,
            stats: StatsAggregator::new(store.clone()),
            store,
            notifier,
        }
    }

    pub fn gate(&self) -> &TradingWindowGate {
        &self.gate
    }

    pub fn store(&self) -> &Arc<SignalStore> {
        &self.store
    }

    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Run one inbound event through the pipeline.
    pub async fn handle(&self, event: SignalEvent) -> Result<PipelineOutcome> {
        let now = self.clock.now();

        if !self.gate.is_open(&now) {
            debug!(
                "{} event at {} outside trading window ({})",
                event.symbol,
                now.format("%a %H:%M:%S"),
                self.gate.describe()
            );
            return Ok(PipelineOutcome::Suppressed {
                reason: SuppressReason::OutsideWindow,
            });
        }

        if let Some(price) = event.price.value {
            self.history.record(&event.symbol, PricePoint::new(now, price));
        }
        let snapshot = self.history.snapshot(&event.symbol, &self.engine)?;

        let candidate = match self.strategy.generate(&event.symbol, &snapshot) {
            Some(c) if c.confidence > CONFIDENCE_FLOOR => c,
            Some(c) => {
                debug!(
                    "{} {} candidate at {:.2} below floor {:.2}",
                    event.symbol, c.action, c.confidence, CONFIDENCE_FLOOR
                );
                return Ok(PipelineOutcome::Suppressed {
                    reason: SuppressReason::LowConfidence,
                });
            }
            None => {
                return Ok(PipelineOutcome::Suppressed {
                    reason: SuppressReason::LowConfidence,
                });
            }
        };

        if candidate.action != event.action_hint {
            debug!(
                "{}: strategy chose {} over hinted {}",
                event.symbol, candidate.action, event.action_hint
            );
        }

        let id = self.store.create(
            &event.symbol,
            candidate.action,
            &event.price,
            candidate.confidence,
        )?;

        self.notify(OutboundMessage::SignalEmitted {
            id,
            symbol: event.symbol.clone(),
            action: candidate.action,
            confidence: candidate.confidence,
            at: now,
            window: self.gate.describe(),
        })
        .await;

        info!(
            "Emitted signal #{} {} {} ({:.1}% via {})",
            id,
            event.symbol,
            candidate.action,
            candidate.confidence * 100.0,
            self.strategy.name()
        );

        Ok(PipelineOutcome::Emitted {
            id,
            action: candidate.action,
            confidence: candidate.confidence,
        })
    }

    /// Store a fixed EURUSD BUY signal, bypassing gate and strategy.
    pub async fn force_test_signal(&self) -> Result<i64> {
        let price = SignalPrice::from_text(TEST_PRICE);
        let id = self
            .store
            .create(TEST_SYMBOL, SignalAction::Buy, &price, 1.0)?;

        self.notify(OutboundMessage::TestSignal {
            id,
            symbol: TEST_SYMBOL.to_string(),
            action: SignalAction::Buy,
            at: self.clock.now(),
        })
        .await;

        info!("Test signal #{} stored", id);
        Ok(id)
    }

    /// Settle a signal and return today's stats after the update.
    pub async fn record_result(&self, update: ResultUpdate) -> Result<DailyStats> {
        self.store
            .update_result(update.signal_id, update.status, update.result_price)?;

        let stats = self.stats.today()?;

        self.notify(OutboundMessage::ResultRecorded {
            id: update.signal_id,
            status: update.status,
            stats: stats.clone(),
        })
        .await;

        Ok(stats)
    }

    async fn notify(&self, message: OutboundMessage) {
        if let Err(e) = self.notifier.send(&message).await {
            warn!(
                "Failed to deliver {} message via {}: {}",
                message.kind(),
                self.notifier.name(),
                e
            );
        }
    }
}
