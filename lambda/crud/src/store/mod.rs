//! Record storage.
//!
//! The handlers only see [`RecordStore`]; [`DynamoDbStore`] is the deployed
//! implementation.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

mod conversions;
mod dynamodb;
#[cfg(test)]
pub mod memory;

pub use dynamodb::DynamoDbStore;

/// A stored record: field name to value. The key field is always present.
pub type Record = Map<String, Value>;

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The write's precondition on the key did not hold.
    #[error("{0}")]
    ConditionFailed(String),
    /// Any other failure reported by the store.
    #[error("{0}")]
    Service(String),
    /// An attribute could not be represented as JSON.
    #[error("unsupported attribute {field}: {reason}")]
    Conversion { field: String, reason: String },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// The four operations the handlers need from a key-value table.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Point lookup by key.
    async fn get(&self, key: &Value) -> Result<Option<Record>>;

    /// Writes `record` only if no record with `key` exists yet.
    ///
    /// Fails with [`StoreError::ConditionFailed`] otherwise.
    async fn put_if_absent(&self, key: &Value, record: &Record) -> Result<()>;

    /// Overwrites `fields` on the existing record and returns the whole record
    /// as it is after the write.
    ///
    /// Never creates a record: a missing key fails with
    /// [`StoreError::ConditionFailed`].
    async fn update(&self, key: &Value, fields: &Record) -> Result<Record>;

    /// Deletes by key, whether or not it exists. Returns whatever attributes
    /// the store reports back.
    async fn delete(&self, key: &Value) -> Result<Record>;
}
