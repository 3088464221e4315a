//! Tag-invalidated read cache
//!
//! Entries are grouped under a tag (`bp-master-c`, `address-master-c100`).
//! Mutations invalidate a whole tag through [`CacheInvalidator`]; reads go
//! through [`TagCache::get_or_load`]. Only successful loads are cached.

use std::future::Future;
use std::time::Duration;

use mdsync_core::CacheInvalidator;
use mdsync_domain::{CacheConfig, MdSyncError, Result};
use moka::sync::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

const KEY_SEPARATOR: &str = "::";

pub struct TagCache {
    entries: Cache<String, Value>,
}

impl TagCache {
    pub fn new(config: &CacheConfig) -> Self {
        let entries = Cache::builder()
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .max_capacity(config.max_capacity)
            .support_invalidation_closures()
            .build();

        debug!(ttl_secs = config.ttl_secs, max_capacity = config.max_capacity, "tag cache ready");
        Self { entries }
    }

    /// Return the cached value for `tag`/`key`, loading and caching it on a miss.
    pub async fn get_or_load<T, F, Fut>(&self, tag: &str, key: &str, load: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let cache_key = entry_key(tag, key);

        if let Some(hit) = self.entries.get(&cache_key) {
            debug!(tag, key, "cache.hit");
            return serde_json::from_value(hit)
                .map_err(|err| MdSyncError::Internal(format!("cached value for {cache_key}: {err}")));
        }

        debug!(tag, key, "cache.miss");
        let loaded = load().await?;
        match serde_json::to_value(&loaded) {
            Ok(value) => self.entries.insert(cache_key, value),
            Err(err) => warn!(tag, key, error = %err, "cache.store_failed"),
        }
        Ok(loaded)
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}

impl CacheInvalidator for TagCache {
    fn invalidate_tag(&self, tag: &str) {
        let prefix = format!("{tag}{KEY_SEPARATOR}");
        match self.entries.invalidate_entries_if(move |key, _| key.starts_with(&prefix)) {
            Ok(_) => debug!(tag, "cache.invalidated"),
            Err(err) => {
                warn!(tag, error = %err, "cache.tag_invalidation_failed; clearing all entries");
                self.entries.invalidate_all();
            }
        }
    }
}

fn entry_key(tag: &str, key: &str) -> String {
    format!("{tag}{KEY_SEPARATOR}{key}")
}
