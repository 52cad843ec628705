//! Per-instance retention: keep the most recent remote backups, delete the rest.
//!
//! Deletions are best-effort and independent: one failed delete never blocks
//! the remaining ones, and a partial failure is reported as
//! [`UploadError::PartialCleanup`] which the runner tolerates.

use tracing::{info, warn};

use crate::b2::types::RemoteFile;
use crate::b2::B2Client;
use crate::fs::discover::retention_prefix;
use crate::utils::errors::{Result, UploadError};

/// Entries for `prefix` that exceed the retention count, in deletion order.
///
/// Filters by prefix, sorts descending by upload timestamp (stable, so
/// listing order breaks ties), and returns everything past the first `keep`.
pub fn select_overflow(files: &[RemoteFile], prefix: &str, keep: usize) -> Vec<RemoteFile> {
    let mut matching: Vec<RemoteFile> = files
        .iter()
        .filter(|f| f.file_name.starts_with(prefix))
        .cloned()
        .collect();
    matching.sort_by_key(|f| std::cmp::Reverse(f.upload_timestamp));
    matching.split_off(keep.min(matching.len()))
}

pub struct RetentionManager<'a> {
    client: &'a B2Client,
    bucket_id: &'a str,
    keep: usize,
}

impl<'a> RetentionManager<'a> {
    pub fn new(client: &'a B2Client, bucket_id: &'a str, keep: usize) -> Self {
        Self {
            client,
            bucket_id,
            keep,
        }
    }

    /// Delete every backup of `instance` beyond the `keep` most recent.
    ///
    /// A listing failure is fatal for the cleanup step. Individual delete
    /// failures are logged and rolled up into `PartialCleanup`; the rest of
    /// the overflow is still attempted.
    pub async fn cleanup(&self, instance: &str) -> Result<()> {
        let files = self.client.list_file_names(self.bucket_id).await?;
        let prefix = retention_prefix(instance);
        let overflow = select_overflow(&files, &prefix, self.keep);

        if overflow.is_empty() {
            info!("No old backups to delete for instance {instance}");
            return Ok(());
        }

        let attempted = overflow.len();
        let mut failed = 0usize;
        for file in &overflow {
            info!("Deleting old backup: {}", file.file_name);
            if let Err(e) = self
                .client
                .delete_file_version(&file.file_id, &file.file_name)
                .await
            {
                warn!("Failed to delete {}: {e}", file.file_name);
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(UploadError::PartialCleanup { failed, attempted });
        }
        Ok(())
    }
}
