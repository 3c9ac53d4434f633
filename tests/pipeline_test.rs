//! End-to-end pipeline scenarios with an injected clock and strategy.

mod common;

use std::sync::Arc;

use binary_signals::services::clock::FixedClock;
use binary_signals::services::{
    IndicatorEngine, IndicatorStrategy, OutboundMessage, PipelineOutcome, RecordingNotifier,
    ResultPolicy, SignalPipeline, StubStrategy, SuppressReason,
};
use binary_signals::types::{
    ResultUpdate, SignalAction, SignalEvent, SignalPrice, SignalStatus,
};
use binary_signals::AppError;
use chrono::Duration;
use common::*;

fn eurusd() -> SignalEvent {
    SignalEvent::new("EURUSD", SignalAction::Buy, SignalPrice::from_text("1.0850"))
}

#[tokio::test]
async fn test_tuesday_evening_emits_pending_signal() {
    let (venue, _) = venue_clock(TUESDAY_EVENING);
    let store = store(&venue, ResultPolicy::Overwrite);
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = pipeline(venue, store.clone(), buy(0.9), notifier.clone());

    let outcome = pipeline.handle(eurusd()).await.unwrap();
    let PipelineOutcome::Emitted { id, action, confidence } = outcome else {
        panic!("expected a signal, got {:?}", outcome);
    };

    assert!(id > 0);
    assert_eq!(action, SignalAction::Buy);
    assert_eq!(confidence, 0.9);

    let signal = store.get(id).unwrap();
    assert_eq!(signal.symbol, "EURUSD");
    assert_eq!(signal.action, SignalAction::Buy);
    assert_eq!(signal.price.display, "1.0850");
    assert_eq!(signal.status, SignalStatus::Pending);
    assert_eq!(signal.created_at.to_rfc3339(), "2024-06-04T20:00:00+05:30");

    match &notifier.sent()[..] {
        [OutboundMessage::SignalEmitted { id: sent, .. }] => assert_eq!(*sent, id),
        other => panic!("unexpected messages: {:?}", other),
    }
}

#[tokio::test]
async fn test_sunday_evening_records_nothing() {
    let (venue, _) = venue_clock(SUNDAY_EVENING);
    let store = store(&venue, ResultPolicy::Overwrite);
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = pipeline(venue, store.clone(), buy(0.9), notifier.clone());

    let outcome = pipeline.handle(eurusd()).await.unwrap();

    assert_eq!(
        outcome,
        PipelineOutcome::Suppressed {
            reason: SuppressReason::OutsideWindow
        }
    );
    assert_eq!(store.count().unwrap(), 0);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_window_edges_follow_the_clock() {
    // Wednesday 17:59:59, one second before opening.
    let (venue, clock) = venue_clock("2024-06-05T17:59:59+05:30");
    let store = store(&venue, ResultPolicy::Overwrite);
    let pipeline = pipeline(venue, store.clone(), buy(0.9), Arc::new(RecordingNotifier::new()));

    assert!(matches!(
        pipeline.handle(eurusd()).await.unwrap(),
        PipelineOutcome::Suppressed {
            reason: SuppressReason::OutsideWindow
        }
    ));

    clock.advance(Duration::seconds(1));
    assert!(matches!(
        pipeline.handle(eurusd()).await.unwrap(),
        PipelineOutcome::Emitted { .. }
    ));

    // 23:59:59 is still open.
    clock.advance(Duration::hours(5) + Duration::minutes(59) + Duration::seconds(59));
    assert!(matches!(
        pipeline.handle(eurusd()).await.unwrap(),
        PipelineOutcome::Emitted { .. }
    ));

    assert_eq!(store.count().unwrap(), 2);
}

#[tokio::test]
async fn test_confidence_at_floor_is_suppressed() {
    let (venue, _) = venue_clock(TUESDAY_EVENING);
    let store = store(&venue, ResultPolicy::Overwrite);
    let pipeline = pipeline(venue, store.clone(), buy(0.75), Arc::new(RecordingNotifier::new()));

    assert_eq!(
        pipeline.handle(eurusd()).await.unwrap(),
        PipelineOutcome::Suppressed {
            reason: SuppressReason::LowConfidence
        }
    );
    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn test_failing_notifier_keeps_committed_signal() {
    let (venue, _) = venue_clock(TUESDAY_EVENING);
    let store = store(&venue, ResultPolicy::Overwrite);
    let pipeline = pipeline(
        venue,
        store.clone(),
        buy(0.9),
        Arc::new(RecordingNotifier::failing()),
    );

    let outcome = pipeline.handle(eurusd()).await.unwrap();
    assert!(matches!(outcome, PipelineOutcome::Emitted { .. }));
    assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test]
async fn test_indicator_strategy_without_history_is_quiet() {
    let (venue, _) = venue_clock(TUESDAY_EVENING);
    let store = store(&venue, ResultPolicy::Overwrite);
    let strategy = Arc::new(IndicatorStrategy::new(30.0, 70.0, &IndicatorEngine::default()));
    let pipeline = pipeline(venue, store.clone(), strategy, Arc::new(RecordingNotifier::new()));

    for i in 0..10 {
        let price = SignalPrice::from_value(1.08 - i as f64 * 0.001);
        let event = SignalEvent::new("EURUSD", SignalAction::Sell, price);
        assert_eq!(
            pipeline.handle(event).await.unwrap(),
            PipelineOutcome::Suppressed {
                reason: SuppressReason::LowConfidence
            }
        );
    }
    assert_eq!(store.count().unwrap(), 0);
}

/// 60 evenly spaced steps of `step`, then one reversal of half a step.
fn trend_then_reversal(start: f64, step: f64) -> Vec<f64> {
    let mut prices: Vec<f64> = (0..60).map(|i| start + i as f64 * step).collect();
    let last = prices[prices.len() - 1];
    prices.push(last - step / 2.0);
    prices
}

/// Feed `prices` one event per minute and return every outcome.
async fn replay(
    pipeline: &SignalPipeline,
    clock: &FixedClock,
    prices: &[f64],
    hint: SignalAction,
) -> Vec<PipelineOutcome> {
    let mut outcomes = Vec::new();
    for price in prices {
        let event = SignalEvent::new("EURUSD", hint, SignalPrice::from_value(*price));
        outcomes.push(pipeline.handle(event).await.unwrap());
        clock.advance(Duration::minutes(1));
    }
    outcomes
}

#[tokio::test]
async fn test_indicator_strategy_buys_reversal_after_decline() {
    let (venue, clock) = venue_clock(TUESDAY_EVENING);
    let store = store(&venue, ResultPolicy::Overwrite);
    let strategy = Arc::new(IndicatorStrategy::new(30.0, 70.0, &IndicatorEngine::default()));
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = pipeline(venue, store.clone(), strategy, notifier.clone());

    let prices = trend_then_reversal(1.10, -0.001);
    let mut outcomes = replay(&pipeline, &clock, &prices, SignalAction::Buy).await;
    let last = outcomes.pop().unwrap();

    assert!(outcomes
        .iter()
        .all(|o| matches!(o, PipelineOutcome::Suppressed { .. })));

    let PipelineOutcome::Emitted { id, action, confidence } = last else {
        panic!("expected a signal on the uptick, got {:?}", last);
    };
    assert_eq!(action, SignalAction::Buy);
    assert!(confidence > 0.75 && confidence <= 1.0, "confidence {}", confidence);

    assert_eq!(store.count().unwrap(), 1);
    let signal = store.get(id).unwrap();
    assert_eq!(signal.action, SignalAction::Buy);
    assert_eq!(signal.status, SignalStatus::Pending);
    assert_eq!(signal.confidence, confidence);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_indicator_strategy_sells_reversal_after_rally() {
    let (venue, clock) = venue_clock(TUESDAY_EVENING);
    let store = store(&venue, ResultPolicy::Overwrite);
    let strategy = Arc::new(IndicatorStrategy::new(30.0, 70.0, &IndicatorEngine::default()));
    let pipeline = pipeline(venue, store.clone(), strategy, Arc::new(RecordingNotifier::new()));

    let prices = trend_then_reversal(1.04, 0.001);
    let mut outcomes = replay(&pipeline, &clock, &prices, SignalAction::Sell).await;
    let last = outcomes.pop().unwrap();

    assert!(outcomes
        .iter()
        .all(|o| matches!(o, PipelineOutcome::Suppressed { .. })));

    let PipelineOutcome::Emitted { id, action, confidence } = last else {
        panic!("expected a signal on the downtick, got {:?}", last);
    };
    assert_eq!(action, SignalAction::Sell);
    assert!(confidence > 0.75 && confidence <= 1.0, "confidence {}", confidence);

    assert_eq!(store.count().unwrap(), 1);
    let signal = store.get(id).unwrap();
    assert_eq!(signal.action, SignalAction::Sell);
    assert_eq!(signal.status, SignalStatus::Pending);
}

#[tokio::test]
async fn test_stub_strategy_emits_only_above_floor() {
    let (venue, _) = venue_clock(TUESDAY_EVENING);
    let store = store(&venue, ResultPolicy::Overwrite);
    let pipeline = pipeline(
        venue,
        store.clone(),
        Arc::new(StubStrategy::with_seed(11)),
        Arc::new(RecordingNotifier::new()),
    );

    let mut emitted = 0;
    for _ in 0..100 {
        let outcome = pipeline.handle(eurusd()).await.unwrap();
        if let PipelineOutcome::Emitted { confidence, .. } = outcome {
            assert!(confidence > 0.75 && confidence <= 0.95);
            emitted += 1;
        }
    }

    assert!(emitted > 0);
    assert_eq!(store.count().unwrap(), emitted);
}

#[tokio::test]
async fn test_daily_tally_after_results() {
    let (venue, _) = venue_clock("2024-06-03T19:00:00+05:30");
    let store = store(&venue, ResultPolicy::Overwrite);
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = pipeline(venue, store.clone(), buy(0.9), notifier.clone());

    let mut ids = Vec::new();
    for _ in 0..3 {
        match pipeline.handle(eurusd()).await.unwrap() {
            PipelineOutcome::Emitted { id, .. } => ids.push(id),
            other => panic!("expected a signal, got {:?}", other),
        }
    }

    pipeline
        .record_result(ResultUpdate {
            signal_id: ids[0],
            status: SignalStatus::Won,
            result_price: None,
        })
        .await
        .unwrap();
    let stats = pipeline
        .record_result(ResultUpdate {
            signal_id: ids[1],
            status: SignalStatus::Lost,
            result_price: Some(1.0801),
        })
        .await
        .unwrap();

    assert_eq!(stats.date.to_string(), "2024-06-03");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.won, 1);
    assert_eq!(stats.lost, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.win_rate, 50.0);

    let Some(OutboundMessage::ResultRecorded { stats: sent, .. }) = notifier.sent().pop() else {
        panic!("missing result message");
    };
    assert_eq!(sent, stats);
}

#[tokio::test]
async fn test_result_for_unknown_signal() {
    let (venue, _) = venue_clock(TUESDAY_EVENING);
    let store = store(&venue, ResultPolicy::Overwrite);
    let notifier = Arc::new(RecordingNotifier::new());
    let pipeline = pipeline(venue, store, buy(0.9), notifier.clone());

    let err = pipeline
        .record_result(ResultUpdate {
            signal_id: 999,
            status: SignalStatus::Won,
            result_price: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_reject_policy_blocks_second_result() {
    let (venue, _) = venue_clock(TUESDAY_EVENING);
    let store = store(&venue, ResultPolicy::RejectSettled);
    let pipeline = pipeline(venue, store.clone(), buy(0.9), Arc::new(RecordingNotifier::new()));

    let id = pipeline.force_test_signal().await.unwrap();
    let won = ResultUpdate {
        signal_id: id,
        status: SignalStatus::Won,
        result_price: None,
    };
    pipeline.record_result(won).await.unwrap();

    let err = pipeline
        .record_result(ResultUpdate {
            status: SignalStatus::Lost,
            ..won
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadySettled(_)));
    assert_eq!(store.get(id).unwrap().status, SignalStatus::Won);
}
