//! Backblaze B2 API client.
//!
//! Thin async bindings over the `b2api/v2` endpoints the uploader needs:
//! account authorization, file listing and deletion, and the large-file
//! (multipart) session calls. Every call is wrapped in the bounded-backoff
//! retry combinator from [`retry`], except [`B2Client::upload_part`] — its
//! one-time target must not be reused across attempts, so the caller retries
//! the *fetch target + upload* pair as one unit.

pub mod retry;
pub mod types;

use bytes::Bytes;

use crate::config::Credentials;
use crate::utils::errors::{Result, UploadError};
use retry::{with_retry, RetryConfig};
use types::{AuthSession, ListFilesResponse, PartUploadTarget, RemoteFile, StartedSession};

/// Account authorization endpoint (the only URL not derived from the session).
pub const AUTH_URL: &str = "https://api.backblazeb2.com/b2api/v2/b2_authorize_account";

/// Content type for uploaded backups; B2 sniffs the real type server-side.
pub const CONTENT_TYPE: &str = "b2/x-auto";

/// Single listing page size. Buckets beyond one page are a known limitation.
pub const LIST_PAGE_SIZE: u32 = 1000;

/// Exchange credentials for an authorization token and endpoint URLs.
pub async fn authorize(credentials: &Credentials, retry: &RetryConfig) -> Result<AuthSession> {
    authorize_at(AUTH_URL, credentials, retry).await
}

pub(crate) async fn authorize_at(
    url: &str,
    credentials: &Credentials,
    retry: &RetryConfig,
) -> Result<AuthSession> {
    let http = reqwest::Client::new();
    let http = &http;
    with_retry(retry, "b2_authorize_account", || async move {
        let resp = http
            .get(url)
            .basic_auth(&credentials.key_id, Some(&credentials.application_key))
            .send()
            .await?;
        let resp = expect_ok("b2_authorize_account", resp).await?;
        Ok(resp.json::<AuthSession>().await?)
    })
    .await
}

/// Authenticated client bound to one authorization session.
pub struct B2Client {
    http: reqwest::Client,
    auth: AuthSession,
    retry: RetryConfig,
}

impl B2Client {
    pub fn new(auth: AuthSession, retry: RetryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
            retry,
        }
    }

    /// Retry policy shared with callers that build their own retry units.
    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Public download URL of a finished file.
    pub fn download_url(&self, bucket_id: &str, file_name: &str) -> String {
        format!("{}/file/{bucket_id}/{file_name}", self.auth.download_url)
    }

    fn api(&self, op: &str) -> String {
        format!("{}/b2api/v2/{op}", self.auth.api_url)
    }

    /// GET an api endpoint with retry, parsing the JSON response.
    async fn get_api<T: serde::de::DeserializeOwned>(
        &self,
        op: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.api(op);
        let url = &url;
        with_retry(&self.retry, op, || async move {
            let resp = self
                .http
                .get(url)
                .header("Authorization", &self.auth.authorization_token)
                .query(query)
                .send()
                .await?;
            let resp = expect_ok(op, resp).await?;
            Ok(resp.json().await?)
        })
        .await
    }

    /// POST a JSON body to an api endpoint with retry, parsing the JSON response.
    async fn post_api<T: serde::de::DeserializeOwned>(
        &self,
        op: &'static str,
        body: serde_json::Value,
    ) -> Result<T> {
        let url = self.api(op);
        let (url, body) = (&url, &body);
        with_retry(&self.retry, op, || async move {
            let resp = self
                .http
                .post(url)
                .header("Authorization", &self.auth.authorization_token)
                .json(body)
                .send()
                .await?;
            let resp = expect_ok(op, resp).await?;
            Ok(resp.json().await?)
        })
        .await
    }

    /// List one page of file versions in the bucket.
    pub async fn list_file_names(&self, bucket_id: &str) -> Result<Vec<RemoteFile>> {
        let page_size = LIST_PAGE_SIZE.to_string();
        let resp: ListFilesResponse = self
            .get_api(
                "b2_list_file_names",
                &[("bucketId", bucket_id), ("maxFileCount", page_size.as_str())],
            )
            .await?;
        Ok(resp.files)
    }

    /// Delete one file version. Versions are keyed by name + id, both required.
    pub async fn delete_file_version(&self, file_id: &str, file_name: &str) -> Result<()> {
        let body = serde_json::json!({ "fileId": file_id, "fileName": file_name });
        self.post_api::<serde_json::Value>("b2_delete_file_version", body)
            .await?;
        Ok(())
    }

    /// Open a multipart session, yielding its session (file) id.
    pub async fn start_large_file(
        &self,
        bucket_id: &str,
        file_name: &str,
    ) -> Result<StartedSession> {
        let body = serde_json::json!({
            "bucketId": bucket_id,
            "fileName": file_name,
            "contentType": CONTENT_TYPE,
        });
        self.post_api("b2_start_large_file", body).await
    }

    /// Fetch a fresh single-use upload target for the session.
    pub async fn get_upload_part_url(&self, file_id: &str) -> Result<PartUploadTarget> {
        let url = self.api("b2_get_upload_part_url");
        let resp = self
            .http
            .get(&url)
            .header("Authorization", &self.auth.authorization_token)
            .query(&[("fileId", file_id)])
            .send()
            .await?;
        let resp = expect_ok("b2_get_upload_part_url", resp).await?;
        Ok(resp.json().await?)
    }

    /// Upload one part's bytes to a previously fetched target.
    ///
    /// Not retried here: the target is single-use, so the caller's retry unit
    /// is the `get_upload_part_url` + `upload_part` pair.
    pub async fn upload_part(
        &self,
        target: &PartUploadTarget,
        part_number: u32,
        sha1_hex: &str,
        body: Bytes,
    ) -> Result<()> {
        let resp = self
            .http
            .post(&target.upload_url)
            .header("Authorization", &target.authorization_token)
            .header("Content-Type", CONTENT_TYPE)
            .header("Content-Length", body.len().to_string())
            .header("X-Bz-Part-Number", part_number.to_string())
            .header("X-Bz-Content-Sha1", sha1_hex)
            .body(body)
            .send()
            .await?;
        expect_ok("b2_upload_part", resp).await?;
        Ok(())
    }

    /// Commit the session with the ordered per-part hash array.
    pub async fn finish_large_file(&self, file_id: &str, part_sha1_array: &[String]) -> Result<()> {
        let body = serde_json::json!({
            "fileId": file_id,
            "partSha1Array": part_sha1_array,
        });
        self.post_api::<serde_json::Value>("b2_finish_large_file", body)
            .await?;
        Ok(())
    }

    /// Abort an in-progress session so it stops consuming storage quota.
    pub async fn cancel_large_file(&self, file_id: &str) -> Result<()> {
        let body = serde_json::json!({ "fileId": file_id });
        self.post_api::<serde_json::Value>("b2_cancel_large_file", body)
            .await?;
        Ok(())
    }
}

/// Map a non-2xx response to an [`UploadError::Api`] carrying the body.
async fn expect_ok(op: &'static str, resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(UploadError::Api {
        op,
        status: status.as_u16(),
        body,
    })
}
