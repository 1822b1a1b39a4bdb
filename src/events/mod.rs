//! Diagnostic events: types and the observable log.
//!
//! ## Contents
//! - [`EventKind`], [`LogEvent`] event classification and payload
//! - [`EventLog`] ordered buffer with synchronous fan-out to subscribers
//! - [`Subscription`] handle used to unsubscribe
//!
//! ## Quick reference
//! - **Appenders**: application code, [`FailureBoundary`](crate::FailureBoundary).
//! - **Consumers**: anything implementing [`Subscribe`](crate::Subscribe), e.g.
//!   the built-in `LogWriter`, diagnostics panels, sync log viewers.

mod event;
mod log;

pub use event::{EventData, EventKind, LogEvent};
pub use log::{EventLog, Subscription};
