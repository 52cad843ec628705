//! Local filesystem concerns: dump discovery and backup naming.

pub mod discover;

pub use discover::BackupFile;
