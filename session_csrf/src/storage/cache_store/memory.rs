use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, InMemoryCacheStore, MemoryEntry};

const CACHE_PREFIX: &str = "cache";

impl InMemoryCacheStore {
    pub(crate) fn new() -> Self {
        tracing::info!("Creating new in-memory generic cache store");
        Self {
            entry: HashMap::new(),
        }
    }

    fn make_key(prefix: &str, key: &str) -> String {
        format!("{CACHE_PREFIX}:{prefix}:{key}")
    }

    fn live_entry(&self, key: &str) -> Option<&MemoryEntry> {
        self.entry
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
    }

    fn purge_expired(&mut self) {
        let now = Instant::now();
        self.entry.retain(|_, entry| entry.expires_at > now);
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError> {
        let key = Self::make_key(prefix, key);
        self.entry.insert(
            key,
            MemoryEntry {
                data: value,
                expires_at: Instant::now() + Duration::from_secs(ttl as u64),
            },
        );
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let key = Self::make_key(prefix, key);
        Ok(self.live_entry(&key).map(|entry| entry.data.clone()))
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        let key = Self::make_key(prefix, key);
        self.entry.remove(&key);
        Ok(())
    }

    async fn put_if_not_exists(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<bool, StorageError> {
        self.purge_expired();
        if self.entry.contains_key(&Self::make_key(prefix, key)) {
            return Ok(false);
        }
        self.put_with_ttl(prefix, key, value, ttl).await?;
        Ok(true)
    }

    async fn compare_and_swap(
        &mut self,
        prefix: &str,
        key: &str,
        expected: &CacheData,
        value: CacheData,
    ) -> Result<bool, StorageError> {
        let key = Self::make_key(prefix, key);
        let now = Instant::now();
        match self.entry.get_mut(&key) {
            Some(entry) if entry.expires_at > now && entry.data == *expected => {
                entry.data = value;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
