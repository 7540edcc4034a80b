//! Minimal end-to-end walkthrough: the facade over the in-memory
//! backend, exercising write/list/read/delete with a namespace prefix.

use crate::adapter::memory::MemoryStore;
use crate::config::BucketConfig;
use crate::vfs::fs::BucketFs;
use std::error::Error;

pub async fn e2e_memory_demo() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = BucketConfig::new("demo-account", "demo-key", "demo-secret", "demo-bucket")
        .with_prefix("demo-ns");
    let fs = BucketFs::new(MemoryStore::new(), &config)?;

    // 1) write a few files across two levels
    fs.write_file("/notes/a.txt", "hello").await?;
    fs.write_file("/notes/b.json", "{}").await?;
    fs.write_file("/notes/deep/c.md", "# c").await?;

    // 2) one directory level back, sorted, subdirectory marked
    let names = fs.read_dir("/notes").await?;
    if names != ["a.txt", "b.json", "deep/"] {
        return Err(format!("unexpected listing: {names:?}").into());
    }

    // 3) content and stat round-trip
    if fs.read_file("/notes/a.txt").await? != "hello" {
        return Err("content mismatch".into());
    }
    let stat = fs.stat("/notes/a.txt").await?;
    if stat.size != 5 || !stat.is_file {
        return Err("unexpected stat".into());
    }

    // 4) recursive delete clears every depth
    fs.delete_dir("/notes").await?;
    if fs.exists("/notes/a.txt").await? || fs.exists("/notes/deep/c.md").await? {
        return Err("delete_dir left objects behind".into());
    }

    Ok(())
}
