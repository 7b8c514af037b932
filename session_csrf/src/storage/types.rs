use serde::{Deserialize, Serialize};

/// Data stored in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CacheData {
    pub(crate) value: String,
}
