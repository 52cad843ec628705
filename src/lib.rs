//! B2 Backup Uploader
//!
//! Uploads local Redis dump files (`dump_<instance>.rdb`) to a Backblaze B2
//! bucket using the large-file multipart protocol, and enforces a
//! per-instance retention policy against the remote listing.

pub mod b2;
pub mod config;
pub mod fs;
pub mod retention;
pub mod runner;
pub mod upload;
pub mod utils;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use config::Config;
pub use utils::errors::UploadError;
pub type Result<T> = std::result::Result<T, UploadError>;
