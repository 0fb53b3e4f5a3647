use bazaar_sdk::objects::{Notification, NotificationDecodeError};
use kanau::processor::Processor;
use serde::Serialize;
use time::OffsetDateTime;

use crate::framework::DatabaseProcessor;

/// Length in bytes of a notification id before hex encoding.
pub const NOTIFICATION_ID_BYTES: usize = 20;

/// A stored notification.
///
/// `payload` is the event serialized as indented JSON and `notification_type`
/// its catalog tag, which together are enough to rebuild the
/// [`Notification`].
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct NotificationRecord {
    pub id: String,
    pub created_at: OffsetDateTime,
    pub read: bool,
    pub notification_type: String,
    pub payload: Vec<u8>,
}

impl NotificationRecord {
    /// Builds an unread record for an already stamped notification.
    pub fn from_notification(notification: &Notification) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: notification.id().to_owned(),
            created_at: OffsetDateTime::now_utc(),
            read: false,
            notification_type: notification.tag().to_owned(),
            payload: canonical_json(notification)?,
        })
    }

    pub fn notification(&self) -> Result<Notification, NotificationDecodeError> {
        Notification::from_tagged_json(&self.notification_type, &self.payload)
    }

    /// Insert this record within a transaction.
    pub async fn insert_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, created_at, read, notification_type, payload)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&self.id)
        .bind(self.created_at)
        .bind(self.read)
        .bind(&self.notification_type)
        .bind(&self.payload)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

/// 20 random bytes, lowercase hex.
pub fn new_notification_id() -> String {
    let bytes: [u8; NOTIFICATION_ID_BYTES] = rand::random();
    hex::encode(bytes)
}

/// JSON with four-space indentation, the stored payload format.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

#[derive(Debug, Clone, Copy)]
/// Most recent notifications first.
pub struct ListRecentNotifications {
    pub limit: i64,
}

impl Processor<ListRecentNotifications> for DatabaseProcessor {
    type Output = Vec<NotificationRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListRecentNotifications")]
    async fn process(
        &self,
        query: ListRecentNotifications,
    ) -> Result<Vec<NotificationRecord>, sqlx::Error> {
        sqlx::query_as::<_, NotificationRecord>(
            r#"
            SELECT id, created_at, read, notification_type, payload
            FROM notifications
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await
    }
}
