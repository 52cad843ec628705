//! Utility modules for the backup uploader.

pub mod errors;
pub mod logger;

pub use errors::{Result, UploadError};
