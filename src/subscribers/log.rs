//! # LogWriter — mirror log events into `tracing`
//!
//! A subscriber that forwards every newly appended [`LogEvent`] to the
//! `tracing` ecosystem, so diagnostics shown in the UI also land in the
//! process log.
//!
//! ## Level mapping
//! ```text
//! error              → ERROR
//! warning            → WARN
//! info/success/sync  → INFO
//! request/response   → DEBUG
//! ```
//!
//! Only events newer than the last one forwarded are written; `clear()` and
//! ring-buffer eviction do not cause duplicates.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::events::{EventKind, LogEvent};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Debug, Default)]
pub struct LogWriter {
    last_id: AtomicU64,
}

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the newest event forwarded so far (`0` before the first).
    pub fn last_forwarded(&self) -> u64 {
        self.last_id.load(Ordering::Acquire)
    }

    fn write(e: &LogEvent) {
        let data = e.data().map(|d| serde_json::Value::Object(d.clone()));
        match e.kind() {
            EventKind::Error => {
                tracing::error!(id = e.id(), at = %e.iso_timestamp(), data = ?data, "{}", e.message())
            }
            EventKind::Warning => {
                tracing::warn!(id = e.id(), at = %e.iso_timestamp(), data = ?data, "{}", e.message())
            }
            EventKind::Request | EventKind::Response => {
                tracing::debug!(id = e.id(), kind = %e.kind(), at = %e.iso_timestamp(), data = ?data, "{}", e.message())
            }
            EventKind::Info | EventKind::Success | EventKind::Sync => {
                tracing::info!(id = e.id(), kind = %e.kind(), at = %e.iso_timestamp(), data = ?data, "{}", e.message())
            }
        }
    }
}

impl Subscribe for LogWriter {
    fn on_change(&self, events: &[LogEvent]) {
        let last = self.last_id.load(Ordering::Acquire);
        let mut newest = last;
        for e in events.iter().filter(|e| e.id() > last) {
            Self::write(e);
            newest = newest.max(e.id());
        }
        self.last_id.fetch_max(newest, Ordering::AcqRel);
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventLog;

    #[test]
    fn test_forwards_each_event_once() {
        let log = EventLog::new();
        let writer = std::sync::Arc::new(LogWriter::new());
        let _sub = log.subscribe_arc(writer.clone());

        let a = log.info("first");
        assert_eq!(writer.last_forwarded(), a.id());

        let b = log.error("second");
        assert_eq!(writer.last_forwarded(), b.id());

        log.clear();
        assert_eq!(writer.last_forwarded(), b.id());

        let c = log.request("third");
        assert_eq!(writer.last_forwarded(), c.id());
    }
}
