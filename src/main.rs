use anyhow::Context;
use clap::{Parser, Subcommand};
use lodestore::cache::DiskCache;
use lodestore::config::Config;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Lodestore - embedded file-backed key-value cache with per-entry TTL
#[derive(Parser, Debug)]
#[command(name = "lodestore")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a value
    Set {
        key: String,
        value: String,
        /// Time to live in seconds
        #[arg(long, default_value_t = 3600)]
        ttl_secs: u64,
    },
    /// Print a stored value to stdout
    Get { key: String },
    /// Remove a stored value
    Delete { key: String },
    /// Remove every entry
    Clear,
    /// Delete expired entries now and print the sweep report as JSON
    Sweep,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::from_file(&args.config)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    lodestore::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging subsystem: {}", e))?;

    // One-shot commands sweep explicitly; a background janitor would never tick
    config.cache.cleanup_interval_ms = 0;

    tracing::debug!(
        config_file = %args.config.display(),
        directory = %config.cache.directory.display(),
        compression = config.cache.use_compression,
        "Configuration loaded successfully"
    );

    let cache = DiskCache::new(config.cache).await?;

    match args.command {
        Command::Set {
            key,
            value,
            ttl_secs,
        } => {
            cache
                .set(&key, value.as_bytes(), Duration::from_secs(ttl_secs))
                .await?;
        }
        Command::Get { key } => {
            let payload = cache.get(&key).await?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&payload)?;
            stdout.write_all(b"\n")?;
        }
        Command::Delete { key } => {
            if !cache.delete(&key).await? {
                tracing::info!(key = %key, "No entry to delete");
            }
        }
        Command::Clear => cache.clear().await?,
        Command::Sweep => {
            if let Some(report) = cache.delete_expired().await {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
    }

    cache.close().await;
    Ok(())
}
