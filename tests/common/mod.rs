//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use binary_signals::config::Config;
use binary_signals::services::clock::{venue_offset, FixedClock, VenueClock};
use binary_signals::services::{
    FixedStrategy, IndicatorEngine, Notifier, PriceHistory, ResultPolicy, SignalPipeline,
    SignalStore, SignalStrategy, TradingWindowGate,
};
use binary_signals::types::{Candidate, SignalAction};
use binary_signals::AppState;

/// Tuesday 20:00 in Colombo.
pub const TUESDAY_EVENING: &str = "2024-06-04T20:00:00+05:30";
/// Sunday 20:00 in Colombo.
pub const SUNDAY_EVENING: &str = "2024-06-09T20:00:00+05:30";

pub fn venue_clock(at: &str) -> (VenueClock, Arc<FixedClock>) {
    let clock = FixedClock::at(at).unwrap();
    let venue = VenueClock::new(clock.clone(), venue_offset(330).unwrap());
    (venue, clock)
}

pub fn store(venue: &VenueClock, policy: ResultPolicy) -> Arc<SignalStore> {
    Arc::new(
        SignalStore::open_in_memory(venue.clone())
            .unwrap()
            .with_policy(policy),
    )
}

pub fn buy(confidence: f64) -> Arc<dyn SignalStrategy> {
    Arc::new(FixedStrategy::new(Some(Candidate::new(SignalAction::Buy, confidence))))
}

pub fn pipeline(
    venue: VenueClock,
    store: Arc<SignalStore>,
    strategy: Arc<dyn SignalStrategy>,
    notifier: Arc<dyn Notifier>,
) -> SignalPipeline {
    SignalPipeline::new(
        TradingWindowGate::default(),
        venue,
        PriceHistory::new(500),
        IndicatorEngine::default(),
        strategy,
        store,
        notifier,
    )
}

pub fn app_state(
    at: &str,
    strategy: Arc<dyn SignalStrategy>,
    notifier: Arc<dyn Notifier>,
    config: Config,
) -> (AppState, Arc<FixedClock>) {
    let (venue, clock) = venue_clock(at);
    let store = store(&venue, config.result_policy);
    let state = AppState::new(config, pipeline(venue, store, strategy, notifier));
    (state, clock)
}
