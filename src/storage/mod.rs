// src/storage/mod.rs

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// String key-value store holding client-side quiz state.
///
/// Writes are last-write-wins. Callers own a single runner per quiz, so there
/// is never more than one writer for a key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Reads and decodes a JSON value.
/// A value that fails to decode is reported as `AppError::Storage`.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, AppError> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn write_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), AppError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}
