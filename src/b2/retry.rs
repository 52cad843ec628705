//! Bounded retry with exponential backoff for remote B2 calls.

use std::future::Future;
use std::time::Duration;

use crate::utils::errors::Result;

/// Retry policy applied uniformly to every remote call.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts after the first (0 = single-shot)
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    pub delay_ms: u64,

    /// Backoff delay cap in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay_ms: 500,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryConfig {
    /// Single-shot policy, reproducing unretried remote calls.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }
}

/// Run `f` until it succeeds, the error is permanent, or the attempt bound is
/// reached. Backoff doubles per attempt up to the cap, with random jitter.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, op_name: &str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay_ms = config.delay_ms;
    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let jitter = rand::random::<u64>() % delay_ms.max(1);
            tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
            delay_ms = (delay_ms * 2).min(config.max_delay_ms);
        }
        match f().await {
            Ok(val) => return Ok(val),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                tracing::warn!(
                    "{op_name}: transient error (attempt {}/{}), retrying: {e}",
                    attempt + 1,
                    config.max_retries + 1,
                );
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap())
}
