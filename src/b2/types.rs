//! Serde bindings for the B2 `b2api/v2` JSON responses.

use serde::Deserialize;

/// Result of `b2_authorize_account`: short-lived token plus endpoint URLs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub authorization_token: String,
    pub api_url: String,
    pub download_url: String,
}

/// One entry from `b2_list_file_names`.
///
/// Objects are versioned by the (file name, file id) pair; both are needed
/// to delete a version. `upload_timestamp` is milliseconds since the epoch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub file_name: String,
    pub file_id: String,
    pub upload_timestamp: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListFilesResponse {
    pub files: Vec<RemoteFile>,
}

/// Result of `b2_start_large_file`: the session identifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedSession {
    pub file_id: String,
    pub file_name: String,
}

/// One-time upload target from `b2_get_upload_part_url`.
///
/// Targets are short-lived and single-use: one is requested per part, and a
/// retried attempt always fetches a fresh one.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartUploadTarget {
    pub upload_url: String,
    pub authorization_token: String,
}
