//! b2-backup - Main entry point
//!
//! Uploads Redis dump files to Backblaze B2 and prunes old remote backups.

use anyhow::Result;
use b2_backup::{config::Config, runner, utils};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory scanned for dump_<instance>.rdb files (overrides environment)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Remote backups kept per instance (overrides environment)
    #[arg(long)]
    keep: Option<usize>,

    /// Multipart chunk size in MiB (overrides environment)
    #[arg(long)]
    chunk_size_mb: Option<u64>,

    /// Part uploads in flight within one session (overrides environment)
    #[arg(long)]
    concurrency: Option<usize>,

    /// When retention cleanup runs: before-upload or after-upload
    #[arg(long)]
    retention_order: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    utils::logger::init(args.log_level.as_deref().unwrap_or("info"))?;

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration failed: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Starting b2-backup v{} (bucket: {}, keep: {})",
        env!("CARGO_PKG_VERSION"),
        config.bucket_id,
        config.keep
    );

    if let Err(e) = runner::run(&config).await {
        tracing::error!("Backup run failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn build_config(args: &Args) -> b2_backup::Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(dir) = &args.dir {
        config.backup_dir = dir.clone();
    }
    if let Some(keep) = args.keep {
        config.keep = keep;
    }
    if let Some(mb) = args.chunk_size_mb {
        config.chunk_size = mb * 1024 * 1024;
    }
    if let Some(concurrency) = args.concurrency {
        config.part_concurrency = concurrency;
    }
    if let Some(order) = &args.retention_order {
        config.retention_order = order.parse()?;
    }
    config.validate()?;
    Ok(config)
}
