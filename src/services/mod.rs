pub mod clock;
pub mod indicators;
pub mod notifier;
pub mod pipeline;
pub mod price_history;
pub mod signal_store;
pub mod stats;
pub mod strategy;
pub mod trading_window;

pub use clock::{Clock, FixedClock, SystemClock, VenueClock};
pub use indicators::{compute_macd, compute_rsi, IndicatorEngine};
pub use notifier::{LogNotifier, Notifier, OutboundMessage, RecordingNotifier, TelegramNotifier};
pub use pipeline::{PipelineOutcome, SignalPipeline, SuppressReason, CONFIDENCE_FLOOR};
pub use price_history::PriceHistory;
pub use signal_store::{ResultPolicy, SignalStore, StatusCounts};
pub use stats::StatsAggregator;
pub use strategy::{FixedStrategy, IndicatorStrategy, SignalStrategy, StrategyKind, StubStrategy};
pub use trading_window::TradingWindowGate;
