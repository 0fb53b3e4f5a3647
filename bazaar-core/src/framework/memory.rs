use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{NotificationStore, StoreError, Transaction};
use crate::entities::NotificationRecord;

/// Process-local store. Saved records become visible on commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<NotificationRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed records in insertion order.
    pub fn records(&self) -> Vec<NotificationRecord> {
        self.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<NotificationRecord> {
        self.lock().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<NotificationRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct MemoryTransaction {
    store: MemoryStore,
    staged: Vec<NotificationRecord>,
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn save(&mut self, record: &NotificationRecord) -> Result<(), StoreError> {
        let taken = self.staged.iter().any(|r| r.id == record.id)
            || self.store.get(&record.id).is_some();
        if taken {
            return Err(StoreError::DuplicateId(record.id.clone()));
        }
        self.staged.push(record.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut records = self.store.lock();
        if let Some(dup) = self
            .staged
            .iter()
            .find(|s| records.iter().any(|r| r.id == s.id))
        {
            return Err(StoreError::DuplicateId(dup.id.clone()));
        }
        records.extend(self.staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, StoreError> {
        Ok(Box::new(MemoryTransaction {
            store: self.clone(),
            staged: Vec::new(),
        }))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<NotificationRecord>, StoreError> {
        Ok(self.lock().iter().rev().take(limit).cloned().collect())
    }
}
