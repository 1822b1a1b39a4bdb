//! # Retry bound for operations.
//!
//! [`RetryPolicy`] pairs the number of retries with the [`BackoffPolicy`]
//! used between them.
//!
//! ```text
//! retries = 2
//!   attempt 1 ─✗─► wait next(0) ─► attempt 2 ─✗─► wait next(1) ─► attempt 3 ─✗─► exhausted
//! ```

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// How many times a failed producer is retried and how long to wait in between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Delay between attempts.
    pub backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    /// 3 retries, fixed 1s delay.
    fn default() -> Self {
        Self {
            retries: 3,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RetryPolicy {
    /// `retries` retries with a fixed `delay`.
    pub fn fixed(retries: u32, delay: Duration) -> Self {
        Self {
            retries,
            backoff: BackoffPolicy::fixed(delay),
        }
    }

    /// Total attempts allowed (`retries + 1`).
    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Delay to wait after failed attempt `attempt` (1-based), or `None` if
    /// that attempt was the last one allowed.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts() {
            None
        } else {
            Some(self.backoff.next(attempt.saturating_sub(1)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_after_stops_at_bound() {
        let p = RetryPolicy::fixed(2, Duration::from_millis(100));
        assert_eq!(p.max_attempts(), 3);
        assert_eq!(p.delay_after(1), Some(Duration::from_millis(100)));
        assert_eq!(p.delay_after(2), Some(Duration::from_millis(100)));
        assert_eq!(p.delay_after(3), None);
    }

    #[test]
    fn test_zero_retries_means_single_attempt() {
        let p = RetryPolicy::fixed(0, Duration::from_secs(1));
        assert_eq!(p.max_attempts(), 1);
        assert_eq!(p.delay_after(1), None);
    }

    #[test]
    fn test_max_retries_does_not_overflow() {
        let p = RetryPolicy::fixed(u32::MAX, Duration::ZERO);
        assert_eq!(p.max_attempts(), u32::MAX);
    }
}
