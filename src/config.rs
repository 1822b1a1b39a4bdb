//! # Crate-wide configuration.
//!
//! Provides [`Config`] centralized defaults for the diagnostics log and for
//! retrying operations.
//!
//! Config is used in two ways:
//! 1. **Log construction**: `EventLog::from_config(&config)`
//! 2. **Operation defaults**: `RetryableOperation::from_config(producer, &config)`
//!
//! ## Sentinel values
//! - `log_capacity = 0` → unbounded log (events are only dropped by `clear()`)

use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::{BackoffPolicy, JitterPolicy, RetryPolicy};

/// Global configuration.
///
/// ## Field semantics
/// - `retries`: retries after the first attempt (`3` → up to 4 attempts)
/// - `delay`: wait between attempts
/// - `backoff_factor`: delay growth per retry (`1.0` = fixed delay)
/// - `max_delay`: cap for grown delays
/// - `jitter`: randomization applied to each delay
/// - `log_capacity`: ring-buffer size of the event log (`0` = unbounded)
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of retries after the first failed attempt.
    pub retries: u32,

    /// Delay before the first retry.
    pub delay: Duration,

    /// Multiplicative delay growth per retry.
    ///
    /// `1.0` keeps the delay fixed at [`Config::delay`].
    pub backoff_factor: f64,

    /// Upper bound for grown delays.
    pub max_delay: Duration,

    /// Randomization applied to each computed delay.
    pub jitter: JitterPolicy,

    /// Maximum number of events kept by the log.
    ///
    /// - `0` = unbounded (grows until `clear()`)
    /// - `n > 0` = ring buffer; the oldest event is evicted on overflow
    pub log_capacity: usize,
}

impl Config {
    /// Returns the log capacity as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → keep at most `n` events
    #[inline]
    pub fn log_capacity_limit(&self) -> Option<usize> {
        if self.log_capacity == 0 {
            None
        } else {
            Some(self.log_capacity)
        }
    }

    /// Returns the backoff policy described by this config.
    #[inline]
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy {
            first: self.delay,
            max: self.max_delay.max(self.delay),
            factor: self.backoff_factor,
            jitter: self.jitter,
        }
    }

    /// Returns the retry policy described by this config.
    #[inline]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            backoff: self.backoff(),
        }
    }

    /// Checks the delay settings.
    ///
    /// A cap below `delay` is rejected here even though [`Config::backoff`]
    /// tolerates it, so misconfiguration surfaces early.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_delay < self.delay {
            return Err(ConfigError::DelayAboveCap {
                first: self.delay,
                max: self.max_delay,
            });
        }
        self.backoff().validate()
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `retries = 3`
    /// - `delay = 1s`, `backoff_factor = 1.0` (fixed delay), `max_delay = 30s`
    /// - `jitter = None`
    /// - `log_capacity = 0` (unbounded)
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::from_millis(1000),
            backoff_factor: 1.0,
            max_delay: Duration::from_secs(30),
            jitter: JitterPolicy::None,
            log_capacity: 0,
        }
    }
}
