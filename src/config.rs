//! Configuration management for the backup uploader.
//!
//! Builds one explicit [`Config`] from the process environment at startup.
//! Components never read ambient environment state themselves; the value is
//! passed down by reference.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::b2::retry::RetryConfig;
use crate::utils::errors::{Result, UploadError};

/// B2 application key pair used for `b2_authorize_account`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub key_id: String,
    pub application_key: String,
}

/// When retention cleanup runs relative to the new upload.
///
/// `BeforeUpload` is the original behavior: a crash between cleanup and a
/// successful upload can leave fewer than `keep` backups for the instance.
/// `AfterUpload` closes that window at the cost of temporarily holding
/// `keep + 1` remote copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionOrder {
    BeforeUpload,
    AfterUpload,
}

impl FromStr for RetentionOrder {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "before-upload" => Ok(RetentionOrder::BeforeUpload),
            "after-upload" => Ok(RetentionOrder::AfterUpload),
            other => Err(UploadError::Config(format!(
                "invalid retention order '{other}' (expected 'before-upload' or 'after-upload')"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// B2 account credentials
    pub credentials: Credentials,

    /// Target bucket identifier
    pub bucket_id: String,

    /// Directory scanned for `dump_<instance>.rdb` files
    pub backup_dir: PathBuf,

    /// Multipart chunk size in bytes
    pub chunk_size: u64,

    /// Most-recent remote backups kept per instance
    pub keep: usize,

    /// Maximum part uploads in flight within one session
    pub part_concurrency: usize,

    /// Whether cleanup runs before or after the new upload
    pub retention_order: RetentionOrder,

    /// Retry policy applied to every remote call
    pub retry: RetryConfig,
}

// Default values
fn default_chunk_size() -> u64 {
    100 * 1024 * 1024 // 100 MiB
}

fn default_keep() -> usize {
    2
}

fn default_part_concurrency() -> usize {
    1
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Missing credentials or bucket id are fatal; everything else falls back
    /// to defaults.
    pub fn from_env() -> Result<Self> {
        let key_id = required_var("B2_APPLICATION_KEY_ID")?;
        let application_key = required_var("B2_APPLICATION_KEY")?;
        let bucket_id = required_var("B2_BUCKET_ID")?;

        let backup_dir = env::var("BACKUP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let chunk_size = parsed_var::<u64>("BACKUP_CHUNK_SIZE_MB")?
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or_else(default_chunk_size);
        let keep = parsed_var("BACKUP_KEEP")?.unwrap_or_else(default_keep);
        let part_concurrency =
            parsed_var("BACKUP_PART_CONCURRENCY")?.unwrap_or_else(default_part_concurrency);
        let retention_order = match env::var("BACKUP_RETENTION_ORDER") {
            Ok(v) => v.parse()?,
            Err(_) => RetentionOrder::BeforeUpload,
        };

        let config = Config {
            credentials: Credentials {
                key_id,
                application_key,
            },
            bucket_id,
            backup_dir,
            chunk_size,
            keep,
            part_concurrency,
            retention_order,
            retry: RetryConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(UploadError::Config("chunk size must be positive".into()));
        }
        if self.part_concurrency == 0 {
            return Err(UploadError::Config(
                "part concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn required_var(name: &'static str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| UploadError::Config(format!("{name} not set in environment")))
}

fn parsed_var<T: FromStr>(name: &'static str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| UploadError::Config(format!("{name} has invalid value '{raw}'"))),
        Err(_) => Ok(None),
    }
}
