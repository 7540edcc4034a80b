//! Per-instance metadata cache.
//!
//! Maps store keys to the last observed size/mtime/etag so `exists` and
//! `stat` can answer without a network round trip. The cache is an
//! explicit bounded mapping (entry-count capacity, no TTL) owned by one
//! facade instance and dropped with it; it is an accelerator, not a
//! source of truth, and staleness against out-of-band bucket mutation
//! is accepted (see `CacheMode`).

use crate::adapter::client::ObjectMeta;
use moka::sync::Cache;
use std::time::SystemTime;

#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub size: u64,
    pub last_modified: SystemTime,
    pub etag: String,
}

impl From<&ObjectMeta> for CacheEntry {
    fn from(meta: &ObjectMeta) -> Self {
        Self {
            size: meta.size,
            last_modified: meta.last_modified,
            etag: meta.etag.clone(),
        }
    }
}

pub struct MetaCache {
    entries: Cache<String, CacheEntry>,
}

impl MetaCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key)
    }

    /// Last observation wins.
    pub fn put(&self, key: &str, entry: CacheEntry) {
        self.entries.insert(key.to_string(), entry);
    }

    pub fn remove(&self, key: &str) {
        self.entries.invalidate(key);
    }
}
