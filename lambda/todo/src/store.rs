//! # Item store
//!
//! The key-value table holding todo records. Handlers only see the
//! [`ItemStore`] trait, so the DynamoDB client is created once at start-up and
//! passed in explicitly.
//!
//! Records are plain JSON objects keyed by their `id` attribute. Translating
//! them to and from DynamoDB attribute values, and escaping attribute names in
//! update expressions, is the store's job rather than the handler's.

mod attribute;
mod dynamodb;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub(crate) use dynamodb::DynamoDbStore;

/// Partition key attribute of the todo table.
pub(crate) const KEY_ATTRIBUTE: &str = "id";

/// A single item as stored in the table.
pub(crate) type Record = Map<String, Value>;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    /// The DynamoDB call itself failed (connectivity, throttling, bad request).
    #[error("{0}")]
    DynamoDb(String),

    /// The call succeeded but the data did not have the expected shape.
    #[error("malformed record: {0}")]
    Malformed(String),
}

impl StoreError {
    pub fn dynamo_db(operation: &str, err: impl std::error::Error) -> Self {
        Self::DynamoDb(format!(
            "{operation} failed: {}",
            aws_sdk_dynamodb::error::DisplayErrorContext(err)
        ))
    }
}

#[async_trait]
pub(crate) trait ItemStore: Send + Sync {
    /// Every item in the table, in whatever order the store returns them.
    async fn scan_all(&self) -> Result<Vec<Record>, StoreError>;

    async fn get_item(&self, id: &str) -> Result<Option<Record>, StoreError>;

    /// Inserts the record, replacing any item with the same `id`.
    async fn put_item(&self, item: Record) -> Result<(), StoreError>;

    /// Sets each field in `changes` on the item and returns its full new state.
    async fn update_item(&self, id: &str, changes: Record) -> Result<Record, StoreError>;

    async fn delete_item(&self, id: &str) -> Result<(), StoreError>;
}
