use anyhow::Context;
use bucketfs::{BucketConfig, BucketFs};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("demo-memory") => {
            bucketfs::vfs::demo::e2e_memory_demo()
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("demo-memory: OK");
        }
        Some("info") => {
            let path = args.next().context("Usage: bucketfs info <config.json>")?;
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {path}"))?;
            let config: BucketConfig = serde_json::from_str(&raw)?;
            let fs = BucketFs::connect(&config).await?;
            let info = fs.bucket_info();
            println!(
                "bucket={} prefix={} region={} account={} endpoint={}",
                info.bucket,
                info.prefix,
                info.region,
                info.account_id,
                config.endpoint_url(),
            );
        }
        _ => {
            println!(
                "Hello, I'm BucketFS!\nUsage:\n  bucketfs demo-memory\n  bucketfs info <config.json>"
            );
        }
    }
    Ok(())
}
