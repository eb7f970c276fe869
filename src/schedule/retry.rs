use crate::error::EtlError;
use log::{info, warn};
use std::future::Future;
use std::time::Duration;

/// How often a failing stage is re-attempted, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(5))
    }
}

/// Runs `op` until it succeeds or the policy's attempts are used up.
///
/// The final failure is wrapped in [`EtlError::RetriesExhausted`] carrying the
/// stage name and the number of attempts made.
pub async fn run_with_retry<T, F, Fut>(
    stage: &str,
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, EtlError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EtlError>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    info!("Stage '{}' succeeded on attempt {}", stage, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    "Stage '{}' failed on attempt {}/{}: {}. Retrying in {:?}",
                    stage, attempt, max_attempts, e, policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(EtlError::RetriesExhausted {
                    stage: stage.to_string(),
                    attempts: attempt,
                    source: Box::new(e),
                })
            }
        }
    }
}
