//! # Delay between retry attempts.
//!
//! [`BackoffPolicy`] decides how long a retrying operation waits after a
//! failed attempt before it tries again. The default is a fixed delay of one
//! second; growth and jitter are opt-in.
//!
//! The delay before retry `n` (0-based) is `first × factor^n`, capped at `max`,
//! then jittered. The base is recomputed from `n` every time, so a short
//! jittered delay never drags later delays down with it.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use faultline::{BackoffPolicy, JitterPolicy};
//!
//! let fixed = BackoffPolicy::fixed(Duration::from_millis(100));
//! assert_eq!(fixed.next(0), Duration::from_millis(100));
//! assert_eq!(fixed.next(7), Duration::from_millis(100));
//!
//! let growing = BackoffPolicy::exponential(
//!     Duration::from_millis(100),
//!     2.0,
//!     Duration::from_secs(1),
//! );
//! assert_eq!(growing.next(1), Duration::from_millis(200));
//! assert_eq!(growing.next(10), Duration::from_secs(1));
//! assert_eq!(growing.jitter, JitterPolicy::None);
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::jitter::JitterPolicy;

/// Retry delay policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Cap for grown delays.
    pub max: Duration,
    /// Multiplicative growth per retry (`1.0` = fixed).
    pub factor: f64,
    /// Randomization applied on top of the computed delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Fixed one second delay, no jitter.
    fn default() -> Self {
        Self::fixed(Duration::from_millis(1000))
    }
}

impl BackoffPolicy {
    /// Same delay before every retry.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Delay starting at `first`, multiplied by `factor` per retry, capped at `max`.
    pub fn exponential(first: Duration, factor: f64, max: Duration) -> Self {
        Self {
            first,
            max,
            factor,
            jitter: JitterPolicy::None,
        }
    }

    /// Returns a copy with the given jitter.
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay to wait before retry number `retry` (0-based).
    ///
    /// Overflowing or non-finite intermediate values resolve to `max`.
    pub fn next(&self, retry: u32) -> Duration {
        let base = self.base(retry);
        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }

    /// Un-jittered delay for `retry`.
    fn base(&self, retry: u32) -> Duration {
        if self.factor == 1.0 {
            return self.first.min(self.max);
        }
        let exp = retry.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);
        if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Rejects factors that would produce nonsense delays and `first > max`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(ConfigError::InvalidFactor {
                factor: self.factor,
            });
        }
        if self.first > self.max {
            return Err(ConfigError::DelayAboveCap {
                first: self.first,
                max: self.max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fixed_one_second() {
        let policy = BackoffPolicy::default();
        for retry in 0..10 {
            assert_eq!(policy.next(retry), Duration::from_secs(1));
        }
    }

    #[test]
    fn test_exponential_growth_no_jitter() {
        let policy =
            BackoffPolicy::exponential(Duration::from_millis(100), 2.0, Duration::from_secs(30));

        assert_eq!(policy.next(0), Duration::from_millis(100));
        assert_eq!(policy.next(1), Duration::from_millis(200));
        assert_eq!(policy.next(2), Duration::from_millis(400));
        assert_eq!(policy.next(3), Duration::from_millis(800));
    }

    #[test]
    fn test_growth_capped() {
        let policy =
            BackoffPolicy::exponential(Duration::from_millis(100), 2.0, Duration::from_secs(1));
        assert_eq!(policy.next(10), Duration::from_secs(1));
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(1));
    }

    #[test]
    fn test_first_above_max_is_clamped_and_rejected() {
        let policy = BackoffPolicy {
            first: Duration::from_secs(10),
            max: Duration::from_secs(5),
            factor: 1.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(0), Duration::from_secs(5));
        assert!(matches!(
            policy.validate(),
            Err(ConfigError::DelayAboveCap { .. })
        ));
    }

    #[test]
    fn test_equal_jitter_stays_in_upper_half() {
        let policy = BackoffPolicy::fixed(Duration::from_millis(1000)).with_jitter(JitterPolicy::Equal);
        for retry in 0..50 {
            let d = policy.next(retry);
            assert!(d >= Duration::from_millis(500), "retry {retry}: {d:?}");
            assert!(d <= Duration::from_millis(1000), "retry {retry}: {d:?}");
        }
    }

    #[test]
    fn test_full_jitter_never_exceeds_base() {
        let policy =
            BackoffPolicy::exponential(Duration::from_millis(100), 2.0, Duration::from_secs(30))
                .with_jitter(JitterPolicy::Full);
        for retry in 0..12 {
            let base = policy.base(retry);
            assert!(policy.next(retry) <= base);
        }
    }

    #[test]
    fn test_validate_factor() {
        let mut policy = BackoffPolicy::default();
        policy.factor = 0.0;
        assert!(matches!(
            policy.validate(),
            Err(ConfigError::InvalidFactor { .. })
        ));
        policy.factor = 1.5;
        policy.max = Duration::from_secs(10);
        assert!(policy.validate().is_ok());
    }
}
