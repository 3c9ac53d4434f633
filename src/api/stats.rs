//! Daily statistics endpoints.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::signals::ApiResponse;
use crate::error::{AppError, Result};
use crate::types::DailyStats;
use crate::AppState;

const DEFAULT_HISTORY_DAYS: u32 = 7;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<u32>,
}

/// Create the stats router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(daily_stats))
        .route("/history", get(history))
}

/// Parse `YYYY-MM-DD`, falling back to `default` when absent.
pub(crate) fn parse_date(raw: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::BadRequest(format!("invalid date {}, expected YYYY-MM-DD", s))),
        None => Ok(default),
    }
}

/// GET /api/stats?date=YYYY-MM-DD
async fn daily_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<DailyStats>>> {
    let stats = state.pipeline.stats();
    let today = state.pipeline.store().clock().today();
    let date = parse_date(query.date.as_deref(), today)?;

    Ok(Json(ApiResponse {
        data: stats.daily(date)?,
    }))
}

/// GET /api/stats/history?days=N
///
/// One entry per venue day, oldest first, ending today.
async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<DailyStats>>>> {
    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS);

    Ok(Json(ApiResponse {
        data: state.pipeline.stats().history(days)?,
    }))
}
