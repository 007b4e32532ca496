//! Injectable sleep abstraction for the retry executor.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

/// Suspends the current task for a backoff delay.
///
/// The executor sleeps through this trait rather than calling the runtime
/// directly, so tests can observe the schedule without waiting on the
/// wall clock.
#[async_trait]
pub trait Sleeper: Send + Sync + fmt::Debug {
    /// Sleeps for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
