//! Client API handlers.
//!
//! # Endpoints
//!
//! - `GET /ws`            – websocket stream of client messages
//! - `GET /notifications` – most recent stored notifications

use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};
use bazaar_core::framework::StoreError;

use crate::state::AppState;

mod notifications;
mod ws;

/// Build the client API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::client_ws))
        .route("/notifications", get(notifications::list_notifications))
}

/// Errors that can occur in API handlers.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    CorruptRecord(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Store(e) => {
                tracing::error!(error = %e, "API store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            ApiError::CorruptRecord(id) => {
                tracing::error!(id = %id, "API: stored notification payload is not valid JSON");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
