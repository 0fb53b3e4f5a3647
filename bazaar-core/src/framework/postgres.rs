use async_trait::async_trait;
use kanau::processor::Processor;
use sqlx::PgPool;

use super::{
    DatabaseProcessor, NotificationStore, StoreError, Transaction, TransactionProcessor,
};
use crate::entities::{ListRecentNotifications, NotificationRecord};

/// Store backed by the `notifications` table.
#[derive(Debug, Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Transaction for TransactionProcessor<'static> {
    async fn save(&mut self, record: &NotificationRecord) -> Result<(), StoreError> {
        record.insert_tx(&mut self.tx).await.map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicateId(record.id.clone())
            }
            other => StoreError::Database(other),
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    #[tracing::instrument(skip_all, err, name = "SQL:BeginNotificationTransaction")]
    async fn begin(&self) -> Result<Box<dyn Transaction>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(TransactionProcessor { tx }))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<NotificationRecord>, StoreError> {
        let processor = DatabaseProcessor {
            pool: self.pool.clone(),
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        Ok(processor.process(ListRecentNotifications { limit }).await?)
    }
}
