mod config;
mod memory;
mod redis;
mod types;

pub(crate) use config::{GENERIC_CACHE_STORE_TYPE, GENERIC_CACHE_STORE_URL};
pub(crate) use types::{CacheStore, InMemoryCacheStore, RedisCacheStore};
