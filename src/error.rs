//! Error types used by faultline.
//!
//! This module defines two error enums:
//!
//! - [`BoundaryError`] — a failure intercepted by a [`FailureBoundary`](crate::FailureBoundary).
//! - [`ConfigError`] — an invalid [`Config`](crate::Config) or [`BackoffPolicy`](crate::BackoffPolicy).
//!
//! Both types provide `as_label` for logs/metrics. Producer errors never show up
//! here: [`RetryableOperation`](crate::RetryableOperation) treats them as opaque
//! values and hands the last one back through its state.

use std::time::Duration;
use thiserror::Error;

/// # Failure caught by a boundary.
///
/// A guarded region either returned an error or panicked. Both are fatal to the
/// region; the boundary logs them once and switches to its fallback.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoundaryError {
    /// The region returned `Err(..)`.
    #[error("region failed: {message}")]
    Errored {
        /// Display form of the returned error.
        message: String,
    },

    /// The region panicked.
    #[error("region panicked: {message}")]
    Panicked {
        /// Panic payload rendered as text (`"unknown panic"` for non-string payloads).
        message: String,
    },
}

impl BoundaryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use faultline::BoundaryError;
    ///
    /// let err = BoundaryError::Panicked { message: "boom".into() };
    /// assert_eq!(err.as_label(), "boundary_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BoundaryError::Errored { .. } => "boundary_errored",
            BoundaryError::Panicked { .. } => "boundary_panicked",
        }
    }

    /// Returns the bare failure message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            BoundaryError::Errored { message } | BoundaryError::Panicked { message } => message,
        }
    }

    /// Builds a [`BoundaryError::Panicked`] from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        BoundaryError::Panicked {
            message: panic_message(payload),
        }
    }
}

/// # Invalid configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Backoff growth factor is negative, zero or not finite.
    #[error("backoff factor must be finite and > 0, got {factor}")]
    InvalidFactor {
        /// The rejected factor.
        factor: f64,
    },

    /// The first delay is larger than the delay cap.
    #[error("first delay {first:?} exceeds cap {max:?}")]
    DelayAboveCap {
        /// Configured first delay.
        first: Duration,
        /// Configured cap.
        max: Duration,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidFactor { .. } => "config_invalid_factor",
            ConfigError::DelayAboveCap { .. } => "config_delay_above_cap",
        }
    }
}

/// Renders a panic payload as text.
///
/// `panic!("literal")` carries `&'static str`, formatted panics carry `String`;
/// anything else is reported as `"unknown panic"`.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
