//! Object-store adapter layer.
//!
//! Submodules:
//! - `client`: the `ObjectStore` trait plus shared request/response types
//! - `s3`: S3-compatible implementation built on `aws-sdk-s3`
//! - `memory`: in-memory implementation for tests and demos
//!
//! Responsibilities summary:
//! - Provide an async put/get/head/delete/list/batch-delete API keyed by
//!   object key, with the bucket bound at backend construction.
//! - Hide transport details: listing pagination, content checksums, and
//!   SDK-specific error shapes stay below this boundary.
//! - Collapse store failures into the small `StoreError` taxonomy the
//!   filesystem facade acts on.

pub mod client;
pub mod memory;
pub mod s3;
