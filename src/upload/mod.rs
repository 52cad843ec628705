//! Multipart upload coordination.
//!
//! Owns the session lifecycle for one file: start the session, drive every
//! part in order through [`part::upload_part`], and commit with the ordered
//! per-part hash array. On any part or commit failure the session is aborted
//! with `b2_cancel_large_file` so it stops consuming storage quota; the
//! failure itself is what the caller sees.

pub mod part;
pub mod plan;

use std::fs::File;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::{info, warn};

use crate::b2::B2Client;
use crate::fs::BackupFile;
use crate::upload::part::UploadedPart;
use crate::upload::plan::PartRange;
use crate::utils::errors::{Result, UploadError};

pub struct MultipartUploader<'a> {
    client: &'a B2Client,
    bucket_id: &'a str,
    chunk_size: u64,
    part_concurrency: usize,
}

impl<'a> MultipartUploader<'a> {
    pub fn new(
        client: &'a B2Client,
        bucket_id: &'a str,
        chunk_size: u64,
        part_concurrency: usize,
    ) -> Self {
        Self {
            client,
            bucket_id,
            chunk_size,
            part_concurrency,
        }
    }

    /// Upload `file` as `remote_name` through one multipart session.
    ///
    /// Returns only after the commit is acknowledged. The source handle is
    /// opened once for the session and closed on every exit path.
    pub async fn upload(&self, file: &BackupFile, remote_name: &str) -> Result<()> {
        let ranges = plan::part_ranges(file.size, self.chunk_size);
        let total_parts = ranges.len();

        let handle = Arc::new(File::open(&file.path)?);

        let started = self
            .client
            .start_large_file(self.bucket_id, remote_name)
            .await?;
        info!(
            "Started multipart session for {remote_name}: {} parts of up to {} bytes",
            total_parts, self.chunk_size
        );

        let result = async {
            let part_sha1_array = self.upload_parts(&handle, &started.file_id, ranges).await?;
            self.client
                .finish_large_file(&started.file_id, &part_sha1_array)
                .await
        }
        .await;

        match result {
            Ok(()) => {
                info!(
                    "Successfully uploaded {remote_name} ({total_parts} parts): {}",
                    self.client.download_url(self.bucket_id, remote_name)
                );
                Ok(())
            }
            Err(e) => {
                // Abort the session so the uploaded parts stop counting
                // against the storage quota. Cancelling a session whose
                // commit actually went through fails harmlessly. The upload
                // error stays primary.
                if let Err(cancel_err) = self.client.cancel_large_file(&started.file_id).await {
                    warn!(
                        "Failed to cancel multipart session {}: {cancel_err}",
                        started.file_id
                    );
                }
                Err(e)
            }
        }
    }

    /// Drive all part jobs and collect their hashes in strict part order.
    ///
    /// Up to `part_concurrency` parts are in flight at once; `buffered`
    /// yields results in input order, so the commit array matches part
    /// numbers regardless of completion order.
    async fn upload_parts(
        &self,
        handle: &Arc<File>,
        file_id: &str,
        ranges: Vec<PartRange>,
    ) -> Result<Vec<String>> {
        let total_parts = ranges.len();
        let parts: Vec<UploadedPart> = stream::iter(ranges.into_iter().map(|range| {
            let handle = Arc::clone(handle);
            async move {
                let part = part::upload_part(self.client, &handle, file_id, range).await?;
                info!("Uploaded part {} of {total_parts}", part.number);
                Ok::<_, UploadError>(part)
            }
        }))
        .buffered(self.part_concurrency)
        .try_collect()
        .await?;

        Ok(parts.into_iter().map(|p| p.sha1).collect())
    }
}
