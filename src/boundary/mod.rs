//! Failure boundaries.
//!
//! A [`FailureBoundary`] turns an otherwise fatal failure inside a guarded
//! region into a logged, recoverable state:
//! - the failure is appended to the [`EventLog`](crate::EventLog) once, as an
//!   `error` event carrying `error`, `detail` and `stack`;
//! - the region is replaced by a fallback view until [`FailureBoundary::reset`];
//! - reset logs an `info` event and tells the host to reload (default) or to
//!   resume in place.
//!
//! This is the only place the crate combines the log with other machinery.

mod failure;
mod guard;

pub use failure::{Failure, Outcome};
pub use guard::{BoundaryBuilder, FailureBoundary, ResetAction, ResetMode};
