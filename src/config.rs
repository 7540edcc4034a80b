//! Construction-time configuration for a bucket-backed filesystem.
//!
//! Identity, credentials and bucket are required and checked before any
//! network use; region defaults to the universal `auto`, the endpoint is
//! derived from the account id unless overridden, and an empty prefix
//! means no namespacing.

use crate::vfs::error::FsError;
use serde::{Deserialize, Serialize};

/// How much the facade trusts cached metadata.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// A cached entry short-circuits `exists`/`stat` without a network
    /// call. Objects deleted out-of-band can be reported as present
    /// until this instance observes the change.
    #[default]
    Trust,
    /// `exists`/`stat` always go to the store; the cache is still
    /// populated and invalidated, it just never answers alone.
    Revalidate,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BucketConfig {
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Namespace prefix prepended to every key; empty disables it.
    #[serde(default)]
    pub prefix: String,
    /// Custom endpoint; defaults to the R2-style URL for `account_id`.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub cache_mode: CacheMode,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_cache_capacity() -> u64 {
    100_000
}

impl BucketConfig {
    pub fn new(
        account_id: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            bucket: bucket.into(),
            region: default_region(),
            prefix: String::new(),
            endpoint: None,
            cache_mode: CacheMode::default(),
            cache_capacity: default_cache_capacity(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), FsError> {
        if self.account_id.is_empty() {
            return Err(FsError::Config("account_id is required".into()));
        }
        if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
            return Err(FsError::Config("access credentials are required".into()));
        }
        if self.bucket.is_empty() {
            return Err(FsError::Config("bucket is required".into()));
        }
        Ok(())
    }

    /// The endpoint override, or the URL derived from the account id.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(url) => url.clone(),
            None => format!("https://{}.r2.cloudflarestorage.com", self.account_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let config: BucketConfig = serde_json::from_str(
            r#"{
                "account_id": "acct",
                "access_key_id": "ak",
                "secret_access_key": "sk",
                "bucket": "media"
            }"#,
        )
        .unwrap();
        assert_eq!(config.region, "auto");
        assert_eq!(config.prefix, "");
        assert_eq!(config.cache_mode, CacheMode::Trust);
        assert_eq!(config.endpoint_url(), "https://acct.r2.cloudflarestorage.com");
        config.validate().unwrap();
    }

    #[test]
    fn test_endpoint_override_wins() {
        let mut config = BucketConfig::new("acct", "ak", "sk", "media");
        config.endpoint = Some("http://127.0.0.1:9000".into());
        assert_eq!(config.endpoint_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        for broken in [
            BucketConfig::new("", "ak", "sk", "media"),
            BucketConfig::new("acct", "", "sk", "media"),
            BucketConfig::new("acct", "ak", "", "media"),
            BucketConfig::new("acct", "ak", "sk", ""),
        ] {
            assert!(broken.validate().is_err());
        }
    }

    #[test]
    fn test_cache_mode_parses_lowercase() {
        let config: BucketConfig = serde_json::from_str(
            r#"{
                "account_id": "a",
                "access_key_id": "b",
                "secret_access_key": "c",
                "bucket": "d",
                "cache_mode": "revalidate"
            }"#,
        )
        .unwrap();
        assert_eq!(config.cache_mode, CacheMode::Revalidate);
    }
}
