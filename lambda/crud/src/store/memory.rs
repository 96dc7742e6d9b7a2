//! In-memory record store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Record, RecordStore, Result, StoreError};

/// Behaves like a hash-keyed table: conditional create, update of existing
/// records only, idempotent delete. Counts every call it receives.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, Record>>,
    calls: AtomicUsize,
    failure: Option<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Seeds a record without counting a call.
    pub async fn insert(&self, key: &Value, record: Record) {
        self.records.write().await.insert(key.to_string(), record);
    }

    /// Reads a record without counting a call.
    pub async fn snapshot(&self, key: &Value) -> Option<Record> {
        self.records.read().await.get(&key.to_string()).cloned()
    }

    /// Number of store operations issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(StoreError::Service(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn get(&self, key: &Value) -> Result<Option<Record>> {
        self.begin()?;
        Ok(self.records.read().await.get(&key.to_string()).cloned())
    }

    async fn put_if_absent(&self, key: &Value, record: &Record) -> Result<()> {
        self.begin()?;
        let mut records = self.records.write().await;
        if records.contains_key(&key.to_string()) {
            return Err(StoreError::ConditionFailed(
                "The conditional request failed".to_string(),
            ));
        }
        records.insert(key.to_string(), record.clone());
        Ok(())
    }

    async fn update(&self, key: &Value, fields: &Record) -> Result<Record> {
        self.begin()?;
        let mut records = self.records.write().await;
        let record = records.get_mut(&key.to_string()).ok_or_else(|| {
            StoreError::ConditionFailed("The conditional request failed".to_string())
        })?;
        for (field, value) in fields {
            record.insert(field.clone(), value.clone());
        }
        Ok(record.clone())
    }

    async fn delete(&self, key: &Value) -> Result<Record> {
        self.begin()?;
        self.records.write().await.remove(&key.to_string());
        Ok(Record::new())
    }
}
