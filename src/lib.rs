//! BucketFS: a filesystem-shaped interface over S3-compatible object
//! storage. Hierarchical paths map onto flat keys through an optional
//! namespace prefix; directories are simulated with prefix/delimiter
//! listings; a bounded per-instance metadata cache makes existence
//! checks and stats cheap.

pub mod adapter;
pub mod config;
pub mod vfs;

pub use adapter::client::{ObjectStore, StoreError};
pub use adapter::memory::MemoryStore;
pub use adapter::s3::S3Store;
pub use config::{BucketConfig, CacheMode};
pub use vfs::error::FsError;
pub use vfs::fs::{BucketFs, BucketInfo, FileStat};
