//! Outcome classification and the backoff schedule.

use std::time::Duration;

use rand::Rng;

use tegate_core::constants::{
    BACKOFF_BASE_MS, BACKOFF_CAP_MS, BACKOFF_JITTER_MS, MAX_ATTEMPTS, RETRYABLE_STATUSES,
};

/// What to do with an HTTP status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// 2xx: parse and return the body.
    Success,
    /// 409, 429 or 5xx: back off and try again while attempts remain.
    Retryable,
    /// Anything else: report immediately.
    Terminal,
}

/// Classifies an upstream status code.
pub fn classify(status: u16) -> Classification {
    match status {
        200..=299 => Classification::Success,
        s if s >= 500 || RETRYABLE_STATUSES.contains(&s) => Classification::Retryable,
        _ => Classification::Terminal,
    }
}

/// Retry limits and backoff parameters.
///
/// The delay before retry `n` (1-based) is
/// `min(base * 2^(n-1), cap) + uniform[0, jitter_max)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base: Duration,
    /// Ceiling on the exponential part
    pub cap: Duration,
    /// Exclusive upper bound of the random jitter
    pub jitter_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base: Duration::from_millis(BACKOFF_BASE_MS),
            cap: Duration::from_millis(BACKOFF_CAP_MS),
            jitter_max: Duration::from_millis(BACKOFF_JITTER_MS),
        }
    }
}

impl RetryPolicy {
    /// A policy with the same attempt limit and no waiting at all.
    pub fn immediate() -> Self {
        Self {
            base: Duration::ZERO,
            cap: Duration::ZERO,
            jitter_max: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Sets the total attempt limit. Zero is treated as one.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Returns true if another attempt may follow attempt number `attempts_made`.
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }

    /// Exponential part of the delay before retry `retry` (1-based), without jitter.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        self.base
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.cap)
            .min(self.cap)
    }

    /// Plans retry number `retry` (1-based), drawing fresh jitter.
    pub fn attempt(&self, retry: u32) -> RetryAttempt {
        let jitter_ms = self.jitter_max.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
        };

        RetryAttempt {
            attempt_number: retry,
            backoff: self.backoff(retry),
            jitter,
        }
    }
}

/// One planned retry. Discarded once the call settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryAttempt {
    /// Which retry this is, starting at 1
    pub attempt_number: u32,
    /// Exponential backoff component
    pub backoff: Duration,
    /// Random jitter component
    pub jitter: Duration,
}

impl RetryAttempt {
    /// Total time to sleep before the retry.
    pub fn delay(&self) -> Duration {
        self.backoff + self.jitter
    }
}
