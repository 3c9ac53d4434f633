pub mod auth;
pub mod health;
pub mod signals;
pub mod stats;

use crate::AppState;
use axum::{body::Bytes, Router};
use serde::de::DeserializeOwned;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{AppError, Result};

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(signals::router())
        .nest("/api/stats", stats::router())
}

/// Full application: routes, CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Decode a request body that must be a non-empty JSON object.
pub(crate) fn json_object<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    if body.is_empty() {
        return Err(AppError::BadRequest("No data".to_string()));
    }

    let value: serde_json::Value = serde_json::from_slice(body)?;
    match value.as_object() {
        Some(fields) if fields.is_empty() => {
            return Err(AppError::BadRequest("No data".to_string()));
        }
        Some(_) => {}
        None => return Err(AppError::BadRequest("body must be a JSON object".to_string())),
    }

    Ok(serde_json::from_value(value)?)
}
