use crate::AppState;
use axum::{routing::get, Json, Router};
use serde::Serialize;

const HOME_TEXT: &str = "Binary Signals Bot is Running! ✅";

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn home() -> &'static str {
    HOME_TEXT
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/api/health", get(health))
}
