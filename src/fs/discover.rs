//! Discovery of local Redis dump files and backup naming.
//!
//! The instance name is the sole join key between local discovery, retention
//! filtering, and remote naming: `dump_<instance>.rdb` locally becomes
//! `redis-backup-<instance>-<timestamp>.rdb` remotely, and retention filters
//! on the `redis-backup-<instance>-` prefix. The derivation is lossless —
//! no normalization, case preserved.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::utils::errors::{Result, UploadError};

const LOCAL_PREFIX: &str = "dump_";
const LOCAL_SUFFIX: &str = ".rdb";
const REMOTE_PREFIX: &str = "redis-backup-";

/// One local dump file selected for upload. Immutable once discovered.
#[derive(Debug, Clone)]
pub struct BackupFile {
    /// Full path to the dump file
    pub path: PathBuf,

    /// Instance name derived from the file name
    pub instance: String,

    /// File size in bytes
    pub size: u64,
}

/// Derive the instance name from a local dump file name.
///
/// Returns `None` unless the name is exactly `dump_<instance>.rdb` with a
/// non-empty instance.
pub fn instance_name(file_name: &str) -> Option<&str> {
    let instance = file_name
        .strip_prefix(LOCAL_PREFIX)?
        .strip_suffix(LOCAL_SUFFIX)?;
    if instance.is_empty() {
        None
    } else {
        Some(instance)
    }
}

/// Remote object name for a new backup of `instance` taken at `now`.
pub fn remote_name(instance: &str, now: DateTime<Utc>) -> String {
    format!(
        "{REMOTE_PREFIX}{instance}-{}{LOCAL_SUFFIX}",
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Remote name prefix shared by every backup of `instance`.
pub fn retention_prefix(instance: &str) -> String {
    format!("{REMOTE_PREFIX}{instance}-")
}

/// Scan `dir` for dump files and derive their instances.
///
/// Results are sorted by file name so run order is deterministic. Finding no
/// candidates is fatal: it fails here, before any network call is made.
pub fn discover(dir: &Path) -> Result<Vec<BackupFile>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(instance) = instance_name(name) else {
            continue;
        };
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        files.push(BackupFile {
            path: entry.path(),
            instance: instance.to_string(),
            size: metadata.len(),
        });
    }

    if files.is_empty() {
        return Err(UploadError::Discovery(format!(
            "no dump_<instance>.rdb files found in {}",
            dir.display()
        )));
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_instance_name_round_trip() {
        assert_eq!(instance_name("dump_cache.rdb"), Some("cache"));
        assert_eq!(instance_name("dump_Primary-01.rdb"), Some("Primary-01"));
    }

    #[test]
    fn test_instance_name_rejects_non_dumps() {
        assert_eq!(instance_name("dump_.rdb"), None);
        assert_eq!(instance_name("dump_cache.txt"), None);
        assert_eq!(instance_name("cache.rdb"), None);
        assert_eq!(instance_name("notes.md"), None);
    }

    #[test]
    fn test_remote_name_format() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            remote_name("cache", ts),
            "redis-backup-cache-2024-01-02T03:04:05.000Z.rdb"
        );
    }

    #[test]
    fn test_remote_name_starts_with_retention_prefix() {
        let name = remote_name("primary", Utc::now());
        assert!(name.starts_with(&retention_prefix("primary")));
        // "primary" must not shadow "primary-replica" and vice versa
        assert!(!name.starts_with(&retention_prefix("primary-replica")));
    }

    #[test]
    fn test_discover_finds_dumps_sorted() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("dump_b.rdb"), b"22")?;
        fs::write(dir.path().join("dump_a.rdb"), b"1")?;
        fs::write(dir.path().join("notes.txt"), b"skip")?;

        let files = discover(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].instance, "a");
        assert_eq!(files[0].size, 1);
        assert_eq!(files[1].instance, "b");
        assert_eq!(files[1].size, 2);
        Ok(())
    }

    #[test]
    fn test_discover_empty_dir_is_discovery_error() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("unrelated.log"), b"x")?;

        let err = discover(dir.path()).unwrap_err();
        assert!(matches!(err, UploadError::Discovery(_)), "got: {err}");
        Ok(())
    }

    #[test]
    fn test_discover_skips_directories() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        fs::create_dir(dir.path().join("dump_fake.rdb"))?;
        fs::write(dir.path().join("dump_real.rdb"), b"data")?;

        let files = discover(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].instance, "real");
        Ok(())
    }
}
