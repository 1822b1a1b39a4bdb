//! # Log subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for anything that renders or
//! forwards the [`EventLog`](crate::EventLog).
//!
//! ## Rules
//! - Called synchronously from inside `append`/`clear`, in registration order.
//! - Receives the complete current list every time.
//! - Panics are caught and reported; they do not reach the appender.
//! - Keep callbacks short: appenders wait for every subscriber.
//!
//! Any `Fn(&[LogEvent]) + Send + Sync + 'static` closure is a subscriber.
//!
//! ## Example
//! ```rust
//! use faultline::{EventKind, LogEvent, Subscribe};
//!
//! struct SyncCounter;
//!
//! impl Subscribe for SyncCounter {
//!     fn on_change(&self, events: &[LogEvent]) {
//!         let synced = events.iter().filter(|e| e.kind() == EventKind::Sync).count();
//!         let _ = synced; // render "N sync events" somewhere
//!     }
//!
//!     fn name(&self) -> &'static str { "sync-counter" }
//! }
//! ```

use crate::events::LogEvent;

/// Observer of [`EventLog`](crate::EventLog) changes.
pub trait Subscribe: Send + Sync + 'static {
    /// Receives the full, ordered list after each append or clear.
    fn on_change(&self, events: &[LogEvent]);

    /// Name used when reporting a panic from this subscriber.
    ///
    /// The default uses `type_name::<Self>()`, which is verbose for closures.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> Subscribe for F
where
    F: Fn(&[LogEvent]) + Send + Sync + 'static,
{
    fn on_change(&self, events: &[LogEvent]) {
        self(events)
    }
}
