//! Exponential backoff around a single transport call.
//!
//! HTTP 429 and transport errors are retried; every other outcome goes back to
//! the caller untouched. Running out of retries is fatal for the whole run.

use crate::error::{Error, Result};
use crate::transport::Response;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// Run `operation` until it yields a non-429 response, making at most
    /// `max_retries + 1` attempts. The delay doubles after every retry with no
    /// jitter and no cap.
    pub async fn run<F, Fut>(&self, url: &str, mut operation: F) -> Result<Response>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Response>>,
    {
        let mut attempt = 0u32;
        let mut delay = self.initial_delay;

        loop {
            attempt += 1;

            let cause = match operation().await {
                Ok(response) if response.is_rate_limited() => "HTTP 429 rate limited".to_string(),
                Ok(response) => {
                    if attempt > 1 {
                        info!(url, attempts = attempt, "request succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(e) if e.is_transient() => e.to_string(),
                Err(e) => return Err(e),
            };

            if attempt > self.max_retries {
                error!(url, attempts = attempt, %cause, "retries exhausted");
                return Err(Error::RetriesExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    cause,
                });
            }

            warn!(
                url,
                attempt,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                %cause,
                "request failed, backing off"
            );

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            delay = delay.saturating_mul(2);
        }
    }
}
