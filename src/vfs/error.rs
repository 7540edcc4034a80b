//! Failure taxonomy for facade operations.
//!
//! Every store failure is caught at the operation level and re-signaled
//! with the logical path attached; the only swallowed case is a
//! not-found during delete (idempotent by contract).

use crate::adapter::client::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("no such file: {path}")]
    NotFound { path: String },

    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("existence check {path}: {source}")]
    Exists {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("delete {path}: {source}")]
    Delete {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("list {path}: {source}")]
    List {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("delete directory {path}: {source}")]
    DeleteDir {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("stat {path}: {source}")]
    Stat {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}
