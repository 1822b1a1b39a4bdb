//! Retry policies.
//!
//! This module groups the knobs that control **how often** an operation is
//! retried and **how long** it waits between attempts.
//!
//! ## Contents
//! - [`RetryPolicy`]   retry count + backoff
//! - [`BackoffPolicy`] delay per retry (fixed by default, optional growth)
//! - [`JitterPolicy`]  randomization of each delay
//!
//! ## Quick wiring
//! ```text
//! OperationBuilder { policy: RetryPolicy }
//!      └─► operation::actor runs attempts:
//!           - policy.max_attempts() bounds the sequence
//!           - policy.delay_after(attempt) schedules the next one
//! ```
//!
//! ## Defaults
//! - `RetryPolicy::default()` → retries=3, fixed 1s delay.
//! - `JitterPolicy::None`.

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;
