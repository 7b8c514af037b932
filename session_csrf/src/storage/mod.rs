mod cache_store;
mod errors;
mod types;

pub(crate) use cache_store::{CacheStore, InMemoryCacheStore, RedisCacheStore};
pub(crate) use cache_store::{GENERIC_CACHE_STORE_TYPE, GENERIC_CACHE_STORE_URL};
pub(crate) use errors::StorageError;
pub(crate) use types::CacheData;
