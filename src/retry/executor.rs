//! Cancellable retry execution.

use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::{RetryPolicy, Sleeper, TokioSleeper};
use crate::classify::classify;

/// The terminal outcome of a failed retry run.
#[derive(Debug, Error)]
pub enum RetryError<E>
where
    E: StdError + 'static,
{
    /// The operation kept failing, or failed in a way that is not worth
    /// retrying. The final error is preserved as the source so outer
    /// layers can still classify it.
    #[error("operation failed after {attempts} attempt(s)")]
    Failed {
        /// Number of attempts performed.
        attempts: u32,
        /// The error returned by the final attempt.
        #[source]
        source: E,
    },

    /// Cancellation fired before the next attempt could start.
    #[error("retry cancelled after {attempts} attempt(s)")]
    Cancelled {
        /// Number of attempts performed before cancellation.
        attempts: u32,
    },
}

impl<E> RetryError<E>
where
    E: StdError + 'static,
{
    /// Returns the number of attempts performed.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Failed { attempts, .. } | RetryError::Cancelled { attempts } => *attempts,
        }
    }

    /// Returns true if the run ended because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }

    /// Consumes the error, returning the final operation error if the run
    /// was not cancelled.
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::Failed { source, .. } => Some(source),
            RetryError::Cancelled { .. } => None,
        }
    }
}

/// Executes operations under a retry policy.
///
/// Holds no state across runs; a single attempt counter lives inside each
/// call, so one retrier may serve concurrent callers.
#[derive(Clone, Debug)]
pub struct Retrier {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Retrier {
    /// Creates a retrier with the given policy and the tokio sleeper.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replaces the sleep implementation.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Returns the policy this retrier runs under.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `op` until it succeeds, fails non-transiently, exhausts its
    /// attempts, or is cancelled.
    ///
    /// Each failure is classified; only transient failures are retried,
    /// after the policy's backoff delay. The wait between attempts races
    /// the cancellation token, so a cancellation that fires mid-wait
    /// aborts the run immediately with [`RetryError::Cancelled`] instead
    /// of the original error.
    pub async fn run<T, E, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: StdError + Send + Sync + 'static,
    {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled { attempts: 0 });
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            tracing::debug!(
                attempt,
                max_attempts = self.policy.max_attempts,
                "invoking operation"
            );

            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let category = classify(&err);
            if !self.policy.should_retry(attempt, category) {
                return Err(RetryError::Failed {
                    attempts: attempt,
                    source: err,
                });
            }

            let delay = self.policy.delay_for(attempt);
            tracing::warn!(
                attempt,
                category = %category,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "transient failure, backing off before retry"
            );

            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(RetryError::Cancelled { attempts: attempt });
                }
                _ = self.sleeper.sleep(delay) => {}
            }
        }
    }
}

/// Runs `op` under `policy` without external cancellation.
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, op: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: StdError + Send + Sync + 'static,
{
    Retrier::new(policy).run(&CancellationToken::new(), op).await
}
