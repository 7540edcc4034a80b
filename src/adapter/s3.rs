//! S3-compatible backend built on `aws-sdk-s3`.
//!
//! The client is configured from [`BucketConfig`]: explicit credentials,
//! a region (S3-compatible stores like R2 use the universal `auto`), and
//! an endpoint derived from the account id unless overridden. Uploads
//! carry a content-md5 checksum; listings loop on continuation tokens so
//! callers always see a complete page.

use crate::adapter::client::{
    BatchDeleteFailure, GetResult, ListPage, ListedObject, ObjectMeta, ObjectStore, StoreError,
};
use crate::config::BucketConfig;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::DateTime;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::AsyncReadExt;

/// DeleteObjects accepts at most 1000 keys per request.
const BATCH_DELETE_LIMIT: usize = 1000;

pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Builds the SDK client from configuration. No network traffic
    /// happens here; the first operation opens connections lazily.
    pub async fn new(config: &BucketConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "bucketfs",
        );
        let conf = aws_config::ConfigLoader::default()
            .credentials_provider(credentials)
            .region(aws_config::Region::new(config.region.clone()))
            .endpoint_url(config.endpoint_url())
            .load()
            .await;
        Self {
            client: Client::new(&conf),
            bucket: config.bucket.clone(),
        }
    }

    fn md5_base64(data: &[u8]) -> String {
        let sum = md5::compute(data);
        B64.encode(sum.0)
    }

    async fn delete_batch(&self, keys: &[String]) -> Result<Vec<BatchDeleteFailure>, StoreError> {
        let mut ids = Vec::with_capacity(keys.len());
        for key in keys {
            ids.push(
                ObjectIdentifier::builder()
                    .key(key)
                    .build()
                    .map_err(StoreError::other)?,
            );
        }
        let delete = Delete::builder()
            .set_objects(Some(ids))
            .build()
            .map_err(StoreError::other)?;
        let resp = self
            .client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(classify)?;
        Ok(resp
            .errors()
            .iter()
            .map(|e| BatchDeleteFailure {
                key: e.key().unwrap_or_default().to_string(),
                code: e.code().unwrap_or_default().to_string(),
                message: e.message().unwrap_or_default().to_string(),
            })
            .collect())
    }
}

/// Collapse an SDK failure: dispatch/timeout-class failures are
/// `Transient`, everything else `Other`. Not-found is recognized at the
/// call sites from the operation's modeled error before this runs.
fn classify<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    if matches!(
        err,
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_)
    ) {
        StoreError::Transient(Box::new(err))
    } else {
        StoreError::Other(Box::new(err))
    }
}

fn system_time(dt: Option<&DateTime>) -> SystemTime {
    match dt {
        Some(t) if t.secs() >= 0 => UNIX_EPOCH + Duration::new(t.secs() as u64, t.subsec_nanos()),
        _ => UNIX_EPOCH,
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get_object(&self, key: &str) -> Result<GetResult, StoreError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if let SdkError::ServiceError(ctx) = &err
                    && ctx.err().is_no_such_key()
                {
                    return StoreError::NotFound;
                }
                classify(err)
            })?;
        let reported_size = resp.content_length();
        let last_modified = system_time(resp.last_modified());
        let etag = resp.e_tag().unwrap_or_default().to_string();
        let mut body = resp.body.into_async_read();
        let mut buf = Vec::new();
        body.read_to_end(&mut buf).await.map_err(StoreError::other)?;
        let size = match reported_size {
            Some(n) if n >= 0 => n as u64,
            _ => buf.len() as u64,
        };
        Ok(GetResult {
            meta: ObjectMeta {
                size,
                last_modified,
                etag,
            },
            data: buf.into(),
        })
    }

    async fn put_object(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, StoreError> {
        let checksum = Self::md5_base64(data);
        let resp = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(data.to_owned().into())
            .content_type(content_type)
            .content_md5(checksum)
            .send()
            .await
            .map_err(classify)?;
        Ok(resp.e_tag().unwrap_or_default().to_string())
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMeta, StoreError> {
        let resp = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if let SdkError::ServiceError(ctx) = &err
                    && ctx.err().is_not_found()
                {
                    return StoreError::NotFound;
                }
                classify(err)
            })?;
        Ok(ObjectMeta {
            size: resp.content_length().unwrap_or(0).max(0) as u64,
            last_modified: system_time(resp.last_modified()),
            etag: resp.e_tag().unwrap_or_default().to_string(),
        })
    }

    async fn delete_object(&self, key: &str) -> Result<(), StoreError> {
        // S3 replies 204 for missing keys, so NotFound never shows here.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn list_objects(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let mut page = ListPage::default();
        let mut token: Option<String> = None;
        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_delimiter(delimiter.map(str::to_string))
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(classify)?;
            for obj in resp.contents() {
                let Some(key) = obj.key() else { continue };
                page.objects.push(ListedObject {
                    key: key.to_string(),
                    meta: ObjectMeta {
                        size: obj.size().unwrap_or(0).max(0) as u64,
                        last_modified: system_time(obj.last_modified()),
                        etag: obj.e_tag().unwrap_or_default().to_string(),
                    },
                });
            }
            for cp in resp.common_prefixes() {
                if let Some(p) = cp.prefix() {
                    page.common_prefixes.push(p.to_string());
                }
            }
            match resp.next_continuation_token() {
                Some(t) if resp.is_truncated() == Some(true) => token = Some(t.to_string()),
                _ => break,
            }
        }
        Ok(page)
    }

    async fn delete_objects(&self, keys: &[String]) -> Result<Vec<BatchDeleteFailure>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let calls = keys
            .chunks(BATCH_DELETE_LIMIT)
            .map(|chunk| self.delete_batch(chunk));
        let results = futures::future::try_join_all(calls).await?;
        Ok(results.into_iter().flatten().collect())
    }
}
