//! Signal API endpoints.
//!
//! - POST /webhook           - Submit a market event
//! - GET  /test              - Store a test signal (admin)
//! - POST /result            - Record WON/LOST for a signal (admin)
//! - GET  /api/signals       - Signals for a venue day (?date=YYYY-MM-DD)
//! - GET  /api/signals/:id   - One signal

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::auth::AdminGuard;
use super::json_object;
use super::stats::parse_date;
use crate::error::Result;
use crate::services::{PipelineOutcome, SuppressReason};
use crate::types::{
    DailyStats, ResultPayload, ResultUpdate, Signal, SignalAction, SignalEvent, WebhookPayload,
};
use crate::AppState;

/// API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Outcome of a webhook call.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WebhookResponse {
    Success {
        signal_id: i64,
        action: SignalAction,
        confidence: f64,
    },
    NoSignal {
        reason: SuppressReason,
        message: String,
    },
}

#[derive(Debug, Serialize)]
pub struct TestSignalResponse {
    pub status: &'static str,
    pub signal_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub status: &'static str,
    pub stats: DailyStats,
}

/// Query parameters for the signal list.
#[derive(Debug, Deserialize)]
pub struct SignalsQuery {
    pub date: Option<String>,
}

/// Create the signals router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/test", get(test_signal))
        .route("/result", post(record_result))
        .route("/api/signals", get(list_signals))
        .route("/api/signals/:id", get(get_signal))
}

/// POST /webhook
///
/// Run an event through the pipeline.
async fn webhook(State(state): State<AppState>, body: Bytes) -> Result<Json<WebhookResponse>> {
    let payload: WebhookPayload = json_object(&body)?;
    let event = SignalEvent::try_from(payload)?;
    info!("Webhook event for {} ({} hint)", event.symbol, event.action_hint);

    let response = match state.pipeline.handle(event).await? {
        PipelineOutcome::Emitted {
            id,
            action,
            confidence,
        } => WebhookResponse::Success {
            signal_id: id,
            action,
            confidence,
        },
        PipelineOutcome::Suppressed { reason } => WebhookResponse::NoSignal {
            reason,
            message: match reason {
                SuppressReason::OutsideWindow => format!(
                    "Outside trading hours ({})",
                    state.pipeline.gate().describe()
                ),
                SuppressReason::LowConfidence => "Low confidence".to_string(),
            },
        },
    };

    Ok(Json(response))
}

/// GET /test
///
/// Store a fixed EURUSD BUY signal regardless of window or strategy.
async fn test_signal(
    _admin: AdminGuard,
    State(state): State<AppState>,
) -> Result<Json<TestSignalResponse>> {
    let signal_id = state.pipeline.force_test_signal().await?;

    Ok(Json(TestSignalResponse {
        status: "test_signal_sent",
        signal_id,
    }))
}

/// POST /result
///
/// Settle a signal and return today's stats.
async fn record_result(
    _admin: AdminGuard,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ResultResponse>> {
    let payload: ResultPayload = json_object(&body)?;
    let update = ResultUpdate::try_from(payload)?;

    let stats = state.pipeline.record_result(update).await?;

    Ok(Json(ResultResponse {
        status: "success",
        stats,
    }))
}

/// GET /api/signals/:id
async fn get_signal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Signal>>> {
    let signal = state.pipeline.store().get(id)?;
    Ok(Json(ApiResponse { data: signal }))
}

/// GET /api/signals?date=YYYY-MM-DD
///
/// Defaults to the current venue day.
async fn list_signals(
    State(state): State<AppState>,
    Query(query): Query<SignalsQuery>,
) -> Result<Json<ApiResponse<Vec<Signal>>>> {
    let store = state.pipeline.store();
    let date = parse_date(query.date.as_deref(), store.clock().today())?;

    Ok(Json(ApiResponse {
        data: store.list_for_date(date)?,
    }))
}
