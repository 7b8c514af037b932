use std::{env, sync::LazyLock};

/// Backend for session state: "memory" or "redis".
pub(crate) static GENERIC_CACHE_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    env::var("GENERIC_CACHE_STORE_TYPE").unwrap_or_else(|_| "memory".to_string())
});

pub(crate) static GENERIC_CACHE_STORE_URL: LazyLock<String> =
    LazyLock::new(|| env::var("GENERIC_CACHE_STORE_URL").unwrap_or_default());
