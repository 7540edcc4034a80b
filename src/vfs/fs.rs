//! Path-level filesystem facade over a flat object store.
//!
//! "Directories" are simulated with key prefixes: listing one level uses
//! the store's delimiter grouping, recursive delete enumerates the whole
//! prefix. A bounded per-instance metadata cache short-circuits
//! existence checks and stat calls (see `CacheMode`). No ordering is
//! guaranteed across concurrently issued operations on overlapping
//! paths; that follows the store's own consistency model.

use crate::adapter::client::{ObjectStore, StoreError};
use crate::adapter::s3::S3Store;
use crate::config::{BucketConfig, CacheMode};
use crate::vfs::cache::{CacheEntry, MetaCache};
use crate::vfs::error::FsError;
use crate::vfs::key::KeyCodec;
use crate::vfs::mime::content_type_for;
use std::collections::HashSet;
use std::time::SystemTime;
use tracing::{debug, warn};

/// Pure read of the instance configuration; no network call.
#[derive(Clone, Debug)]
pub struct BucketInfo {
    pub bucket: String,
    pub prefix: String,
    pub region: String,
    pub account_id: String,
    pub endpoint: Option<String>,
}

/// Statistics synthesized for one object. Only objects have statistics
/// in this model, so `is_file` is always true; the store keeps a single
/// modification time, so created/accessed mirror it.
#[derive(Clone, Debug)]
pub struct FileStat {
    pub size: u64,
    pub modified: SystemTime,
    pub created: SystemTime,
    pub accessed: SystemTime,
    pub is_file: bool,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl FileStat {
    fn from_entry(entry: &CacheEntry) -> Self {
        Self {
            size: entry.size,
            modified: entry.last_modified,
            created: entry.last_modified,
            accessed: entry.last_modified,
            is_file: true,
            is_dir: false,
            is_symlink: false,
        }
    }
}

pub struct BucketFs<S: ObjectStore> {
    store: S,
    keys: KeyCodec,
    cache: MetaCache,
    cache_mode: CacheMode,
    info: BucketInfo,
}

impl BucketFs<S3Store> {
    /// Builds an S3-backed filesystem from configuration. Fails before
    /// any network use when required fields are missing.
    pub async fn connect(config: &BucketConfig) -> Result<Self, FsError> {
        config.validate()?;
        let store = S3Store::new(config).await;
        Self::new(store, config)
    }
}

impl<S: ObjectStore> BucketFs<S> {
    pub fn new(store: S, config: &BucketConfig) -> Result<Self, FsError> {
        config.validate()?;
        let keys = KeyCodec::new(&config.prefix);
        let info = BucketInfo {
            bucket: config.bucket.clone(),
            prefix: keys.prefix().to_string(),
            region: config.region.clone(),
            account_id: config.account_id.clone(),
            endpoint: config.endpoint.clone(),
        };
        Ok(Self {
            store,
            keys,
            cache: MetaCache::new(config.cache_capacity),
            cache_mode: config.cache_mode,
            info,
        })
    }

    pub fn bucket_info(&self) -> &BucketInfo {
        &self.info
    }

    /// Directory prefix key for `path`: encoded and `/`-terminated.
    /// The root maps to the bare namespace prefix (or the empty key).
    fn dir_key(&self, path: &str) -> String {
        let mut key = self.keys.encode(path);
        if !key.is_empty() && !key.ends_with('/') {
            key.push('/');
        }
        key
    }

    /// Reads the whole object and decodes it as UTF-8.
    pub async fn read_file(&self, path: &str) -> Result<String, FsError> {
        let key = self.keys.encode(path);
        let got = self.store.get_object(&key).await.map_err(|e| match e {
            StoreError::NotFound => FsError::NotFound {
                path: path.to_string(),
            },
            other => FsError::Read {
                path: path.to_string(),
                source: other,
            },
        })?;
        self.cache.put(&key, CacheEntry::from(&got.meta));
        String::from_utf8(got.data.to_vec()).map_err(|e| FsError::Read {
            path: path.to_string(),
            source: StoreError::other(e),
        })
    }

    /// Writes `content` verbatim, with a content type inferred from the
    /// path's extension. Refreshes the cache unconditionally.
    pub async fn write_file(&self, path: &str, content: &str) -> Result<(), FsError> {
        let key = self.keys.encode(path);
        let etag = self
            .store
            .put_object(&key, content.as_bytes(), content_type_for(path))
            .await
            .map_err(|e| FsError::Write {
                path: path.to_string(),
                source: e,
            })?;
        debug!(path, size = content.len(), "wrote object");
        self.cache.put(
            &key,
            CacheEntry {
                size: content.len() as u64,
                last_modified: SystemTime::now(),
                etag,
            },
        );
        Ok(())
    }

    pub async fn exists(&self, path: &str) -> Result<bool, FsError> {
        let key = self.keys.encode(path);
        if self.cache_mode == CacheMode::Trust && self.cache.get(&key).is_some() {
            return Ok(true);
        }
        match self.store.head_object(&key).await {
            Ok(meta) => {
                self.cache.put(&key, CacheEntry::from(&meta));
                Ok(true)
            }
            Err(StoreError::NotFound) => Ok(false),
            Err(e) => Err(FsError::Exists {
                path: path.to_string(),
                source: e,
            }),
        }
    }

    /// Idempotent: deleting a missing object is a successful no-op.
    pub async fn delete_file(&self, path: &str) -> Result<(), FsError> {
        let key = self.keys.encode(path);
        let result = self.store.delete_object(&key).await;
        self.cache.remove(&key);
        match result {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(FsError::Delete {
                path: path.to_string(),
                source: e,
            }),
        }
    }

    /// Lists one directory level. Object children come back as plain
    /// names, simulated subdirectories with a trailing `/`; the result
    /// is sorted. An empty result is a normal success: directory
    /// absence and emptiness are indistinguishable here.
    pub async fn read_dir(&self, path: &str) -> Result<Vec<String>, FsError> {
        let prefix = self.dir_key(path);
        let page = self
            .store
            .list_objects(&prefix, Some("/"))
            .await
            .map_err(|e| FsError::List {
                path: path.to_string(),
                source: e,
            })?;
        let mut names = Vec::new();
        for obj in &page.objects {
            // an object stored at the directory prefix itself is not listable
            if obj.key == prefix {
                continue;
            }
            let Some(rest) = obj.key.strip_prefix(prefix.as_str()) else {
                continue;
            };
            // the delimiter request already keeps deeper keys out; guard anyway
            if rest.contains('/') {
                continue;
            }
            self.cache.put(&obj.key, CacheEntry::from(&obj.meta));
            names.push(rest.to_string());
        }
        for cp in &page.common_prefixes {
            let Some(rest) = cp.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let name = rest.trim_end_matches('/');
            if !name.is_empty() {
                names.push(format!("{name}/"));
            }
        }
        names.sort();
        Ok(names)
    }

    /// Recursive delete by listing: enumerates every key under the
    /// prefix at every depth, then batch-deletes them. Empty listings
    /// succeed. Per-key refusals from the store fail the operation.
    pub async fn delete_dir(&self, path: &str) -> Result<(), FsError> {
        let prefix = self.dir_key(path);
        let page = self
            .store
            .list_objects(&prefix, None)
            .await
            .map_err(|e| FsError::DeleteDir {
                path: path.to_string(),
                source: e,
            })?;
        if page.objects.is_empty() {
            return Ok(());
        }
        let keys: Vec<String> = page.objects.iter().map(|o| o.key.clone()).collect();
        let failures = self
            .store
            .delete_objects(&keys)
            .await
            .map_err(|e| FsError::DeleteDir {
                path: path.to_string(),
                source: e,
            })?;
        if !failures.is_empty() {
            warn!(path, failed = failures.len(), "batch delete refused keys");
            // refused keys are still in the bucket; keep their cache entries
            let refused: HashSet<&str> = failures.iter().map(|f| f.key.as_str()).collect();
            for key in keys.iter().filter(|k| !refused.contains(k.as_str())) {
                self.cache.remove(key);
            }
            let first = &failures[0];
            return Err(FsError::DeleteDir {
                path: path.to_string(),
                source: StoreError::other(std::io::Error::other(format!(
                    "{} object(s) not deleted (first: {} {}: {})",
                    failures.len(),
                    first.key,
                    first.code,
                    first.message
                ))),
            });
        }
        for key in &keys {
            self.cache.remove(key);
        }
        debug!(path, count = keys.len(), "deleted directory contents");
        Ok(())
    }

    pub async fn stat(&self, path: &str) -> Result<FileStat, FsError> {
        let key = self.keys.encode(path);
        if self.cache_mode == CacheMode::Trust
            && let Some(entry) = self.cache.get(&key)
        {
            return Ok(FileStat::from_entry(&entry));
        }
        match self.store.head_object(&key).await {
            Ok(meta) => {
                let entry = CacheEntry::from(&meta);
                self.cache.put(&key, entry.clone());
                Ok(FileStat::from_entry(&entry))
            }
            Err(StoreError::NotFound) => Err(FsError::NotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(FsError::Stat {
                path: path.to_string(),
                source: e,
            }),
        }
    }

    /// The store has no directory objects; nothing to create.
    pub async fn ensure_dir(&self, _path: &str) -> Result<(), FsError> {
        Ok(())
    }

    /// The store has no permission model; accepted and ignored. Callers
    /// must not rely on this enforcing any access control.
    pub async fn set_permissions(&self, _path: &str, _mode: u32) -> Result<(), FsError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::client::{
        BatchDeleteFailure, GetResult, ListPage, ObjectMeta, ObjectStore,
    };
    use crate::adapter::memory::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config() -> BucketConfig {
        BucketConfig::new("acct", "ak", "sk", "media")
    }

    fn memfs() -> BucketFs<MemoryStore> {
        BucketFs::new(MemoryStore::new(), &config()).unwrap()
    }

    /// Forwards to a shared MemoryStore while counting head calls.
    struct CountingStore {
        inner: MemoryStore,
        heads: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                heads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ObjectStore for CountingStore {
        async fn get_object(&self, key: &str) -> Result<GetResult, StoreError> {
            self.inner.get_object(key).await
        }
        async fn put_object(
            &self,
            key: &str,
            data: &[u8],
            content_type: &str,
        ) -> Result<String, StoreError> {
            self.inner.put_object(key, data, content_type).await
        }
        async fn head_object(&self, key: &str) -> Result<ObjectMeta, StoreError> {
            self.heads.fetch_add(1, Ordering::SeqCst);
            self.inner.head_object(key).await
        }
        async fn delete_object(&self, key: &str) -> Result<(), StoreError> {
            self.inner.delete_object(key).await
        }
        async fn list_objects(
            &self,
            prefix: &str,
            delimiter: Option<&str>,
        ) -> Result<ListPage, StoreError> {
            self.inner.list_objects(prefix, delimiter).await
        }
        async fn delete_objects(
            &self,
            keys: &[String],
        ) -> Result<Vec<BatchDeleteFailure>, StoreError> {
            self.inner.delete_objects(keys).await
        }
    }

    /// Forwards to a MemoryStore but refuses to batch-delete one key.
    struct RefusingStore {
        inner: MemoryStore,
        refuse: String,
    }

    #[async_trait]
    impl ObjectStore for RefusingStore {
        async fn get_object(&self, key: &str) -> Result<GetResult, StoreError> {
            self.inner.get_object(key).await
        }
        async fn put_object(
            &self,
            key: &str,
            data: &[u8],
            content_type: &str,
        ) -> Result<String, StoreError> {
            self.inner.put_object(key, data, content_type).await
        }
        async fn head_object(&self, key: &str) -> Result<ObjectMeta, StoreError> {
            self.inner.head_object(key).await
        }
        async fn delete_object(&self, key: &str) -> Result<(), StoreError> {
            self.inner.delete_object(key).await
        }
        async fn list_objects(
            &self,
            prefix: &str,
            delimiter: Option<&str>,
        ) -> Result<ListPage, StoreError> {
            self.inner.list_objects(prefix, delimiter).await
        }
        async fn delete_objects(
            &self,
            keys: &[String],
        ) -> Result<Vec<BatchDeleteFailure>, StoreError> {
            let mut failures = Vec::new();
            let mut deletable = Vec::new();
            for key in keys {
                if *key == self.refuse {
                    failures.push(BatchDeleteFailure {
                        key: key.clone(),
                        code: "AccessDenied".into(),
                        message: "object locked".into(),
                    });
                } else {
                    deletable.push(key.clone());
                }
            }
            self.inner.delete_objects(&deletable).await?;
            Ok(failures)
        }
    }

    #[tokio::test]
    async fn test_write_read_roundtrip() {
        let fs = memfs();
        fs.write_file("/docs/hello.txt", "héllo wörld 漢字").await.unwrap();
        let content = fs.read_file("/docs/hello.txt").await.unwrap();
        assert_eq!(content, "héllo wörld 漢字");
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let fs = memfs();
        match fs.read_file("/absent.txt").await {
            Err(FsError::NotFound { path }) => assert_eq!(path, "/absent.txt"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let fs = memfs();
        fs.delete_file("/never/existed.txt").await.unwrap();

        fs.write_file("/f.txt", "x").await.unwrap();
        fs.delete_file("/f.txt").await.unwrap();
        fs.delete_file("/f.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_exists_tracks_write_and_delete() {
        let fs = memfs();
        assert!(!fs.exists("/a.txt").await.unwrap());
        fs.write_file("/a.txt", "x").await.unwrap();
        assert!(fs.exists("/a.txt").await.unwrap());
        fs.delete_file("/a.txt").await.unwrap();
        assert!(!fs.exists("/a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_stat_and_exists_short_circuit_from_cache() {
        let store = Arc::new(CountingStore::new());
        let fs = BucketFs::new(store.clone(), &config()).unwrap();

        fs.write_file("/s.txt", "12345").await.unwrap();
        // write populated the cache; neither call should head the store
        assert!(fs.exists("/s.txt").await.unwrap());
        let stat = fs.stat("/s.txt").await.unwrap();
        assert_eq!(stat.size, 5);
        assert_eq!(store.heads.load(Ordering::SeqCst), 0);

        // repeated stats keep returning identical cached values
        let again = fs.stat("/s.txt").await.unwrap();
        assert_eq!(again.size, stat.size);
        assert_eq!(again.modified, stat.modified);
        assert_eq!(store.heads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_revalidate_mode_always_heads_the_store() {
        let store = Arc::new(CountingStore::new());
        let fs = BucketFs::new(
            store.clone(),
            &config().with_cache_mode(CacheMode::Revalidate),
        )
        .unwrap();

        fs.write_file("/r.txt", "x").await.unwrap();
        assert!(fs.exists("/r.txt").await.unwrap());
        fs.stat("/r.txt").await.unwrap();
        assert_eq!(store.heads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stat_synthesizes_file_statistics() {
        let fs = memfs();
        fs.write_file("/s/data.json", "{\"k\":1}").await.unwrap();
        let stat = fs.stat("/s/data.json").await.unwrap();
        assert_eq!(stat.size, 7);
        assert!(stat.is_file);
        assert!(!stat.is_dir);
        assert!(!stat.is_symlink);
        assert_eq!(stat.created, stat.modified);
        assert_eq!(stat.accessed, stat.modified);
    }

    #[tokio::test]
    async fn test_stat_missing_is_not_found() {
        let fs = memfs();
        assert!(matches!(
            fs.stat("/nope").await,
            Err(FsError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_dir_shape() {
        let fs = memfs();
        fs.write_file("d/a.txt", "1").await.unwrap();
        fs.write_file("d/b.json", "2").await.unwrap();
        fs.write_file("d/sub/c.md", "3").await.unwrap();

        let names = fs.read_dir("d").await.unwrap();
        assert_eq!(names, ["a.txt", "b.json", "sub/"]);

        // trailing slash on the query changes nothing
        assert_eq!(fs.read_dir("d/").await.unwrap(), names);
    }

    #[tokio::test]
    async fn test_read_dir_excludes_object_at_prefix_key() {
        let fs = memfs();
        fs.write_file("d/", "placeholder").await.unwrap();
        fs.write_file("d/a.txt", "1").await.unwrap();
        assert_eq!(fs.read_dir("d").await.unwrap(), ["a.txt"]);
    }

    #[tokio::test]
    async fn test_read_dir_empty_is_ok() {
        let fs = memfs();
        assert_eq!(fs.read_dir("/nothing/here").await.unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_read_dir_root_lists_top_level() {
        let fs = memfs();
        fs.write_file("top.txt", "1").await.unwrap();
        fs.write_file("dir/inner.txt", "2").await.unwrap();
        assert_eq!(fs.read_dir("/").await.unwrap(), ["dir/", "top.txt"]);
    }

    #[tokio::test]
    async fn test_delete_dir_is_recursive() {
        let store = Arc::new(MemoryStore::new());
        let fs = BucketFs::new(store.clone(), &config()).unwrap();
        fs.write_file("d/x.txt", "1").await.unwrap();
        fs.write_file("d/y/z.txt", "2").await.unwrap();

        fs.delete_dir("d").await.unwrap();
        assert!(!fs.exists("d/x.txt").await.unwrap());
        assert!(!fs.exists("d/y/z.txt").await.unwrap());
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_dir_surfaces_batch_refusals() {
        let store = Arc::new(RefusingStore {
            inner: MemoryStore::new(),
            refuse: "d/locked.txt".into(),
        });
        let fs = BucketFs::new(store.clone(), &config()).unwrap();
        fs.write_file("d/locked.txt", "1").await.unwrap();
        fs.write_file("d/free.txt", "2").await.unwrap();

        match fs.delete_dir("d").await {
            Err(FsError::DeleteDir { path, source }) => {
                assert_eq!(path, "d");
                let message = source.to_string();
                assert!(message.contains("1 object(s)"), "message: {message}");
                assert!(message.contains("d/locked.txt"), "message: {message}");
            }
            other => panic!("expected DeleteDir failure, got {other:?}"),
        }

        // the refused object survives (its cache entry too), its sibling is gone
        assert_eq!(store.inner.object_count(), 1);
        assert!(fs.exists("d/locked.txt").await.unwrap());
        assert!(!fs.exists("d/free.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_dir_missing_is_ok() {
        let fs = memfs();
        fs.delete_dir("/no/such/dir").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_dir_leaves_siblings() {
        let fs = memfs();
        fs.write_file("keep/a.txt", "1").await.unwrap();
        fs.write_file("drop/b.txt", "2").await.unwrap();
        fs.delete_dir("drop").await.unwrap();
        assert!(fs.exists("keep/a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_prefix_isolation_between_instances() {
        let store = Arc::new(MemoryStore::new());
        let one = BucketFs::new(store.clone(), &config().with_prefix("ns-one")).unwrap();
        let two = BucketFs::new(store.clone(), &config().with_prefix("ns-two")).unwrap();

        one.write_file("/shared.txt", "from one").await.unwrap();
        two.write_file("/shared.txt", "from two").await.unwrap();

        assert_eq!(one.read_file("/shared.txt").await.unwrap(), "from one");
        assert_eq!(two.read_file("/shared.txt").await.unwrap(), "from two");
        assert_eq!(one.read_dir("/").await.unwrap(), ["shared.txt"]);

        one.delete_dir("/").await.unwrap();
        assert!(!one.exists("/shared.txt").await.unwrap());
        assert!(two.exists("/shared.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_write_records_content_type() {
        let store = Arc::new(MemoryStore::new());
        let fs = BucketFs::new(store.clone(), &config()).unwrap();
        fs.write_file("/page.html", "<html/>").await.unwrap();
        assert_eq!(store.content_type_of("page.html").unwrap(), "text/html");
    }

    #[tokio::test]
    async fn test_ensure_dir_and_set_permissions_are_noops() {
        let fs = memfs();
        fs.ensure_dir("/any/depth/of/dir").await.unwrap();
        fs.set_permissions("/whatever", 0o755).await.unwrap();
    }

    #[tokio::test]
    async fn test_bucket_info_is_pure_config() {
        let fs = BucketFs::new(MemoryStore::new(), &config().with_prefix("/ns/")).unwrap();
        let info = fs.bucket_info();
        assert_eq!(info.bucket, "media");
        // normalized the same way keys are built
        assert_eq!(info.prefix, "ns");
        assert_eq!(info.region, "auto");
        assert_eq!(info.account_id, "acct");
        assert!(info.endpoint.is_none());
    }

    #[test]
    fn test_construction_rejects_invalid_config() {
        let bad = BucketConfig::new("", "ak", "sk", "media");
        assert!(matches!(
            BucketFs::new(MemoryStore::new(), &bad),
            Err(FsError::Config(_))
        ));
    }
}
