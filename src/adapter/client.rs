//! High-level object-store API used by the filesystem facade.
//!
//! Backends implement [`ObjectStore`] against one bucket; keys are the
//! store's flat namespace. Listing results are logically complete: a
//! backend folds its own pagination before returning a [`ListPage`].

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

/// Metadata the store reports for one object.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectMeta {
    pub size: u64,
    pub last_modified: SystemTime,
    pub etag: String,
}

/// Object content plus the metadata observed alongside it.
#[derive(Clone, Debug)]
pub struct GetResult {
    pub meta: ObjectMeta,
    pub data: Bytes,
}

/// One object summary from a prefix listing.
#[derive(Clone, Debug)]
pub struct ListedObject {
    pub key: String,
    pub meta: ObjectMeta,
}

/// Result of a prefix listing, pagination already folded.
///
/// `common_prefixes` carries the delimiter grouping's synthetic
/// subdirectory markers, each ending with the delimiter.
#[derive(Clone, Debug, Default)]
pub struct ListPage {
    pub objects: Vec<ListedObject>,
    pub common_prefixes: Vec<String>,
}

/// A key the store refused to delete in a batch call.
#[derive(Clone, Debug)]
pub struct BatchDeleteFailure {
    pub key: String,
    pub code: String,
    pub message: String,
}

/// Store failures collapsed to the cases the facade distinguishes.
///
/// `Transient` (network/timeout-class) is not retried at this layer;
/// retry policy belongs to the store client underneath.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found")]
    NotFound,
    #[error("transient store failure: {0}")]
    Transient(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("store failure: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Other(Box::new(err))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

/// The five primitive operations (plus batch delete) the facade needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, key: &str) -> Result<GetResult, StoreError>;

    /// Returns the etag the store assigned to the written object.
    async fn put_object(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, StoreError>;

    async fn head_object(&self, key: &str) -> Result<ObjectMeta, StoreError>;

    async fn delete_object(&self, key: &str) -> Result<(), StoreError>;

    async fn list_objects(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> Result<ListPage, StoreError>;

    /// Deletes a set of keys. Returns the keys the store refused to
    /// delete; an empty vector means full success.
    async fn delete_objects(&self, keys: &[String]) -> Result<Vec<BatchDeleteFailure>, StoreError>;
}

// One backend instance can serve several facade instances (e.g. facades
// with different namespace prefixes over the same bucket).
#[async_trait]
impl<S: ObjectStore + ?Sized> ObjectStore for Arc<S> {
    async fn get_object(&self, key: &str) -> Result<GetResult, StoreError> {
        (**self).get_object(key).await
    }

    async fn put_object(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, StoreError> {
        (**self).put_object(key, data, content_type).await
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMeta, StoreError> {
        (**self).head_object(key).await
    }

    async fn delete_object(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete_object(key).await
    }

    async fn list_objects(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        (**self).list_objects(prefix, delimiter).await
    }

    async fn delete_objects(&self, keys: &[String]) -> Result<Vec<BatchDeleteFailure>, StoreError> {
        (**self).delete_objects(keys).await
    }
}
