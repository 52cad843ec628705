//! Single-part upload: positioned read, SHA-1, one authenticated POST.

use std::fs::File;
use std::sync::Arc;

use bytes::Bytes;
use sha1::{Digest, Sha1};

use crate::b2::retry::with_retry;
use crate::b2::B2Client;
use crate::upload::plan::PartRange;
use crate::utils::errors::Result;

/// Result of one uploaded part: its number, length, and content hash.
#[derive(Debug, Clone)]
pub struct UploadedPart {
    pub number: u32,
    pub length: u64,
    pub sha1: String,
}

/// Hex-encoded SHA-1 digest, as B2 expects in `X-Bz-Content-Sha1`.
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// Read exactly `range` from the session's shared file handle.
///
/// Positioned reads keep the handle seek-free, so concurrent part jobs can
/// share one open file.
async fn read_range(file: &Arc<File>, range: PartRange) -> Result<Bytes> {
    let file = Arc::clone(file);
    let buf = tokio::task::spawn_blocking(move || -> std::io::Result<Vec<u8>> {
        use std::os::unix::fs::FileExt;
        let mut buf = vec![0u8; range.length as usize];
        file.read_exact_at(&mut buf, range.start)?;
        Ok(buf)
    })
    .await
    .map_err(std::io::Error::other)??;
    Ok(Bytes::from(buf))
}

/// Upload one part of an open multipart session.
///
/// The retried unit is the *fetch target + upload* pair: B2 part-upload URLs
/// are single-use, so every attempt gets a fresh one. The hash is computed
/// once over the exact range bytes and returned for the final commit.
pub async fn upload_part(
    client: &B2Client,
    file: &Arc<File>,
    file_id: &str,
    range: PartRange,
) -> Result<UploadedPart> {
    let body = read_range(file, range).await?;
    let sha1 = sha1_hex(&body);

    with_retry(client.retry(), "b2_upload_part", || {
        let body = body.clone();
        let sha1 = sha1.clone();
        async move {
            let target = client.get_upload_part_url(file_id).await?;
            client.upload_part(&target, range.number, &sha1, body).await
        }
    })
    .await?;

    Ok(UploadedPart {
        number: range.number,
        length: range.length,
        sha1,
    })
}
