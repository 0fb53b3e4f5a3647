//! Notification persistence.
//!
//! Writers go through [`update`], which opens a [`Transaction`], runs the
//! caller's body, and commits on success or rolls back on error.

pub mod memory;
pub mod postgres;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::warn;

use crate::entities::NotificationRecord;

pub use memory::MemoryStore;
pub use postgres::PgNotificationStore;

/// Errors that can occur while persisting notifications.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A record with this id already exists
    #[error("duplicate notification id: {0}")]
    DuplicateId(String),

    /// The transaction was already committed or rolled back
    #[error("transaction is no longer active")]
    TransactionClosed,
}

/// A unit of writes against a [`NotificationStore`].
#[async_trait]
pub trait Transaction: Send {
    async fn save(&mut self, record: &NotificationRecord) -> Result<(), StoreError>;
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn Transaction>, StoreError>;

    /// Most recent records first.
    async fn recent(&self, limit: usize) -> Result<Vec<NotificationRecord>, StoreError>;
}

#[async_trait]
impl<T: NotificationStore + ?Sized> NotificationStore for Arc<T> {
    async fn begin(&self) -> Result<Box<dyn Transaction>, StoreError> {
        (**self).begin().await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<NotificationRecord>, StoreError> {
        (**self).recent(limit).await
    }
}

/// Future returned by an [`update`] body.
pub type TxFuture<'t, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 't>>;

/// Runs `body` inside a transaction.
///
/// Commits when the body succeeds. When it fails the transaction is rolled
/// back and the body's error returned.
pub async fn update<S, F, T>(store: &S, body: F) -> Result<T, StoreError>
where
    S: NotificationStore + ?Sized,
    F: for<'t> FnOnce(&'t mut dyn Transaction) -> TxFuture<'t, T> + Send,
    T: Send,
{
    let mut tx = store.begin().await?;
    let result = body(tx.as_mut()).await;
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Failed to roll back notification transaction");
            }
            Err(e)
        }
    }
}

pub struct DatabaseProcessor {
    pub pool: PgPool,
}

pub struct TransactionProcessor<'b> {
    pub tx: sqlx::Transaction<'b, sqlx::Postgres>,
}
