//! Retry policy for transient network failures.

use crate::error::VaultResult;
use std::future::Future;
use tracing::warn;

/// Number of extra attempts made after a transient failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Runs `op`, retrying it while it fails with a transient error.
    ///
    /// Non-transient errors are returned from the first attempt.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> VaultResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = VaultResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!("{label} failed ({e}), retrying ({attempt}/{})", self.max_retries);
                }
                result => return result,
            }
        }
    }
}
