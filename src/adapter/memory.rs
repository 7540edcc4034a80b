//! In-memory backend: a `BTreeMap` of key -> object that mimics S3
//! semantics, including delimiter grouping and quiet deletes of missing
//! keys. Used by tests and the demo binary.

use crate::adapter::client::{
    BatchDeleteFailure, GetResult, ListPage, ListedObject, ObjectMeta, ObjectStore, StoreError,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::time::SystemTime;

#[derive(Clone)]
struct MemObject {
    data: Bytes,
    content_type: String,
    meta: ObjectMeta,
}

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, MemObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Content type recorded for a stored object, if present.
    pub fn content_type_of(&self, key: &str) -> Option<String> {
        let objects = self.objects.lock().unwrap();
        objects.get(key).map(|o| o.content_type.clone())
    }

    fn md5_hex(data: &[u8]) -> String {
        format!("{:x}", md5::compute(data))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get_object(&self, key: &str) -> Result<GetResult, StoreError> {
        let objects = self.objects.lock().unwrap();
        let obj = objects.get(key).ok_or(StoreError::NotFound)?;
        Ok(GetResult {
            meta: obj.meta.clone(),
            data: obj.data.clone(),
        })
    }

    async fn put_object(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, StoreError> {
        let etag = Self::md5_hex(data);
        let obj = MemObject {
            data: Bytes::copy_from_slice(data),
            content_type: content_type.to_string(),
            meta: ObjectMeta {
                size: data.len() as u64,
                last_modified: SystemTime::now(),
                etag: etag.clone(),
            },
        };
        self.objects.lock().unwrap().insert(key.to_string(), obj);
        Ok(etag)
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMeta, StoreError> {
        let objects = self.objects.lock().unwrap();
        objects
            .get(key)
            .map(|o| o.meta.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn delete_object(&self, key: &str) -> Result<(), StoreError> {
        // S3 deletes are quiet on missing keys.
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn list_objects(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let objects = self.objects.lock().unwrap();
        let mut page = ListPage::default();
        let mut grouped = BTreeSet::new();
        for (key, obj) in objects.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            let rest = &key[prefix.len()..];
            if let Some(delim) = delimiter
                && let Some(i) = rest.find(delim)
            {
                grouped.insert(format!("{prefix}{}{delim}", &rest[..i]));
                continue;
            }
            page.objects.push(ListedObject {
                key: key.clone(),
                meta: obj.meta.clone(),
            });
        }
        page.common_prefixes = grouped.into_iter().collect();
        Ok(page)
    }

    async fn delete_objects(&self, keys: &[String]) -> Result<Vec<BatchDeleteFailure>, StoreError> {
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(key);
        }
        Ok(Vec::new())
    }
}
