//! Filesystem facade layer.
//!
//! Submodules:
//! - `key`: logical path <-> store key translation (namespace prefix)
//! - `cache`: bounded per-instance metadata cache
//! - `mime`: extension -> content-type lookup for uploads
//! - `error`: per-operation failure taxonomy
//! - `fs`: the `BucketFs` facade itself
//! - `demo`: end-to-end walkthrough over the in-memory backend

pub mod cache;
pub mod demo;
pub mod error;
pub mod fs;
pub mod key;
pub mod mime;
