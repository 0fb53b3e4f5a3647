use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use bazaar_core::entities::NotificationRecord;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub limit: Option<usize>,
}

/// A stored notification as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    #[serde(rename = "notificationID")]
    pub notification_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub read: bool,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub notification: serde_json::Value,
}

impl TryFrom<NotificationRecord> for NotificationView {
    type Error = ApiError;

    fn try_from(record: NotificationRecord) -> Result<Self, ApiError> {
        let notification = serde_json::from_slice(&record.payload)
            .map_err(|_| ApiError::CorruptRecord(record.id.clone()))?;
        Ok(Self {
            notification_id: record.id,
            timestamp: record.created_at,
            read: record.read,
            notification_type: record.notification_type,
            notification,
        })
    }
}

/// `GET /notifications` - most recent notifications first.
pub(super) async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let records = state.store.recent(limit).await.map_err(ApiError::Store)?;
    let response = records
        .into_iter()
        .map(NotificationView::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(response))
}
