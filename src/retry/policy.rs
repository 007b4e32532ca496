//! Backoff schedule configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::Category;

/// Configuration for retry behavior with exponential backoff.
///
/// The delay before retry `n` is `base_delay * backoff_factor^(n - 1)`,
/// capped at `max_delay`, with optional deterministic jitter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the initial one. Always ≥ 1.
    /// Default: 4
    pub max_attempts: u32,

    /// Delay before the first retry.
    /// Default: 100 milliseconds
    pub base_delay: Duration,

    /// Multiplier applied to the delay after each attempt. Always ≥ 1.0.
    /// Default: 2.0
    pub backoff_factor: f64,

    /// Ceiling on the delay between any two attempts.
    /// Default: 10 seconds
    pub max_delay: Duration,

    /// Percentage of jitter applied to delays (0-100). Zero keeps the
    /// schedule exact.
    /// Default: 0
    pub jitter_percent: u8,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(10),
            jitter_percent: 0,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy from the four schedule parameters, clamping them
    /// into their valid ranges.
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        backoff_factor: f64,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            backoff_factor: backoff_factor.max(1.0),
            max_delay,
            jitter_percent: 0,
        }
    }

    /// Sets the attempt cap. Clamped to at least one attempt.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the delay before the first retry.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Sets the per-attempt delay multiplier. Clamped to at least 1.0.
    pub fn with_backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.backoff_factor = backoff_factor.max(1.0);
        self
    }

    /// Sets the delay ceiling.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Sets the jitter percentage. Clamped to 100.
    pub fn with_jitter_percent(mut self, jitter_percent: u8) -> Self {
        self.jitter_percent = jitter_percent.min(100);
        self
    }

    /// Calculates the delay to wait after the given failed attempt.
    ///
    /// `attempt` is 1-based. The raw delay grows multiplicatively and is
    /// capped at `max_delay`; jitter, when configured, nudges the capped
    /// value deterministically by the attempt number.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let base_millis = self.base_delay.as_millis() as f64;
        let raw_millis = base_millis * self.backoff_factor.powi(exponent);
        let capped_millis = raw_millis.min(self.max_delay.as_millis() as f64);

        if self.jitter_percent == 0 {
            return Duration::from_millis(capped_millis as u64);
        }

        let jitter_range = capped_millis * f64::from(self.jitter_percent) / 100.0;
        let jittered = (capped_millis + self.deterministic_jitter(attempt, jitter_range)).max(0.0);
        Duration::from_millis(jittered as u64)
    }

    /// Derives jitter from the attempt number so that schedules stay
    /// reproducible under test. Alternates sign by parity and scales
    /// within the configured range.
    fn deterministic_jitter(&self, attempt: u32, jitter_range: f64) -> f64 {
        let sign = if attempt % 2 == 0 { 1.0 } else { -1.0 };
        let scale = ((attempt % 5) as f64 + 1.0) / 5.0;
        jitter_range * sign * scale
    }

    /// Reports whether another attempt should be made after a failure of
    /// the given category on the given 1-based attempt.
    ///
    /// Only transient failures are eligible.
    pub fn should_retry(&self, attempt: u32, category: Category) -> bool {
        category.is_retryable() && attempt < self.max_attempts
    }
}
