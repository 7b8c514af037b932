use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Instant;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

pub(super) struct MemoryEntry {
    pub(super) data: CacheData,
    pub(super) expires_at: Instant,
}

pub(crate) struct InMemoryCacheStore {
    pub(super) entry: HashMap<String, MemoryEntry>,
}

pub(crate) struct RedisCacheStore {
    pub(super) client: redis::Client,
}

#[async_trait]
pub(crate) trait CacheStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Put a value into the store with a TTL in seconds.
    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError>;

    /// Get a value from the store. Expired entries are reported as absent.
    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError>;

    /// Remove a value from the store. Removing a missing key is not an error.
    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError>;

    /// Put a value into the store only if the key is not already taken.
    /// Returns true if the value was stored.
    async fn put_if_not_exists(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<bool, StorageError>;

    /// Replace the value only if it still equals `expected`, keeping the remaining TTL.
    /// Returns false when the key is gone or holds something else.
    async fn compare_and_swap(
        &mut self,
        prefix: &str,
        key: &str,
        expected: &CacheData,
        value: CacheData,
    ) -> Result<bool, StorageError>;
}
