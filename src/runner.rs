//! Run orchestration: discover dumps, authorize once, then apply retention
//! and upload per instance.
//!
//! The first fatal error aborts the whole run; remaining files are not
//! attempted. Partial retention failures are the one tolerated error.

use chrono::Utc;
use tracing::{info, warn};

use crate::b2::{self, B2Client};
use crate::config::{Config, RetentionOrder};
use crate::fs::discover::{discover, remote_name};
use crate::retention::RetentionManager;
use crate::upload::MultipartUploader;
use crate::utils::errors::{Result, UploadError};

pub async fn run(config: &Config) -> Result<()> {
    run_with_auth_url(config, b2::AUTH_URL).await
}

pub(crate) async fn run_with_auth_url(config: &Config, auth_url: &str) -> Result<()> {
    // Discovery runs first: an empty directory fails before any network call.
    let files = discover(&config.backup_dir)?;
    info!(
        "Found {} dump file(s) in {}",
        files.len(),
        config.backup_dir.display()
    );

    let auth = b2::authorize_at(auth_url, &config.credentials, &config.retry).await?;
    let client = B2Client::new(auth, config.retry.clone());

    let retention = RetentionManager::new(&client, &config.bucket_id, config.keep);
    let uploader = MultipartUploader::new(
        &client,
        &config.bucket_id,
        config.chunk_size,
        config.part_concurrency,
    );

    for file in &files {
        let name = remote_name(&file.instance, Utc::now());
        info!(
            "Backing up instance {} ({} bytes) as {name}",
            file.instance, file.size
        );

        // Cleanup-before-upload is the faithful default: a crash between the
        // two can leave fewer than `keep` backups for the instance. The
        // after-upload order closes that window.
        match config.retention_order {
            RetentionOrder::BeforeUpload => {
                cleanup_tolerant(&retention, &file.instance).await?;
                uploader.upload(file, &name).await?;
            }
            RetentionOrder::AfterUpload => {
                uploader.upload(file, &name).await?;
                cleanup_tolerant(&retention, &file.instance).await?;
            }
        }
    }
    Ok(())
}

/// Run cleanup for one instance, tolerating partial deletion failures.
/// Listing failures and other errors stay fatal.
async fn cleanup_tolerant(retention: &RetentionManager<'_>, instance: &str) -> Result<()> {
    match retention.cleanup(instance).await {
        Ok(()) => Ok(()),
        Err(e @ UploadError::PartialCleanup { .. }) => {
            warn!("Retention cleanup for {instance} incomplete: {e}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
