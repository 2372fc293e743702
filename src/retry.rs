//! Bounded retry for workflow runs.
//!
//! A non-200 status, a timeout, or a transport error consumes one attempt.
//! Retries are immediate and sequential. Once the attempts are exhausted the
//! last failure is returned, mapped onto [`RelayError`].

use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::RelayError;
use crate::provider::{ProviderReply, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `call` until it yields a 200 reply or the attempts run out.
    pub async fn run<F, Fut>(
        &self,
        operation: &'static str,
        timeout: Duration,
        mut call: F,
    ) -> Result<ProviderReply, RelayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<ProviderReply, TransportError>>,
    {
        let max = self.max_attempts;
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!("{} request attempt {}/{}", operation, attempt, max);

            let failure = match call().await {
                Ok(reply) if reply.status == 200 => {
                    debug!("{} succeeded on attempt {}/{}", operation, attempt, max);
                    return Ok(reply);
                }
                Ok(reply) => {
                    warn!(
                        "{} call failed - status: {}, error: {}",
                        operation, reply.status, reply.body
                    );
                    RelayError::WorkflowCall {
                        operation,
                        attempts: max,
                        status: reply.status,
                        body: reply.body,
                    }
                }
                Err(TransportError::Timeout(message)) => {
                    warn!("{} timed out (attempt {}): {}", operation, attempt, message);
                    RelayError::Timeout {
                        operation,
                        attempts: max,
                        timeout_secs: timeout.as_secs_f64(),
                        message,
                    }
                }
                Err(TransportError::Request(message)) => {
                    warn!("{} request error (attempt {}): {}", operation, attempt, message);
                    RelayError::Transport {
                        operation,
                        attempts: max,
                        message,
                    }
                }
            };

            if attempt >= max {
                error!("{} giving up after {} attempts", operation, max);
                return Err(failure);
            }
            info!("{} attempt {}/{} failed, retrying", operation, attempt, max);
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}
