//! # Observable in-memory event log.
//!
//! [`EventLog`] keeps an ordered list of [`LogEvent`]s and pushes the **whole**
//! list to every registered [`Subscribe`]r each time it changes.
//!
//! ## Architecture
//! ```text
//! Appenders (many):                              Subscribers (many):
//!   retry UI ──┐                                 ┌──► diagnostics panel
//!   boundary ──┼─► append() ─► [buffer] ─► notify ┼──► sync log viewer
//!   app code ──┘   clear()     (VecDeque)  (sync) └──► LogWriter (tracing)
//! ```
//!
//! ## Rules
//! - **Full snapshots**: subscribers receive the complete current list, never deltas.
//! - **Synchronous**: every subscriber has been called before `append`/`clear` returns.
//! - **Registration order**: subscribers are called in the order they subscribed.
//! - **Isolation**: a panicking subscriber is reported via `tracing` and skipped;
//!   the others are still notified and the buffer is untouched.
//! - **No filtering**: consumers filter the snapshot themselves.
//! - **Capacity**: unbounded by default; with a capacity the oldest event is
//!   evicted on overflow.
//!
//! ## Re-entrancy
//! Deliveries hold a re-entrant dispatch lock. Other threads wait for the
//! running delivery to finish, so notifications never interleave. A subscriber
//! may call back into the log from its own callback; the nested change is
//! delivered to every subscriber, and the outer delivery then stops, since
//! its list is no longer current.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use faultline::{EventKind, EventLog, LogEvent};
//!
//! let log = EventLog::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&seen);
//! let sub = log.subscribe(move |events: &[LogEvent]| {
//!     counter.store(events.len(), Ordering::SeqCst);
//! });
//!
//! log.append(EventKind::Error, "DB timeout", None);
//! log.info("retrying");
//! assert_eq!(seen.load(Ordering::SeqCst), 2);
//!
//! sub.unsubscribe();
//! log.clear();
//! assert_eq!(seen.load(Ordering::SeqCst), 2);
//! assert!(log.is_empty());
//! ```

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, ReentrantMutex};
use serde::Serialize;

use super::event::{to_event_data, EventData, EventKind, LogEvent};
use crate::config::Config;
use crate::error::panic_message;
use crate::subscribers::Subscribe;

/// Ordered storage with optional ring-buffer capacity.
struct Buffer {
    events: VecDeque<LogEvent>,
    capacity: Option<usize>,
    last_at: Option<DateTime<Utc>>,
    /// Bumped by every push and clear.
    version: u64,
}

impl Buffer {
    fn push(&mut self, kind: EventKind, message: String, data: Option<EventData>) -> LogEvent {
        let now = Utc::now();
        let at = match self.last_at {
            Some(last) if now < last => last,
            _ => now,
        };
        self.last_at = Some(at);

        let event = LogEvent::new(kind, message, data, at);
        if let Some(cap) = self.capacity {
            while self.events.len() >= cap {
                self.events.pop_front();
            }
        }
        self.events.push_back(event.clone());
        self.version += 1;
        event
    }

    fn clear(&mut self) -> u64 {
        self.events.clear();
        self.version += 1;
        self.version
    }

    fn snapshot(&self) -> Vec<LogEvent> {
        self.events.iter().cloned().collect()
    }
}

struct Registered {
    id: u64,
    subscriber: Arc<dyn Subscribe>,
}

struct Inner {
    buffer: Mutex<Buffer>,
    subscribers: Mutex<Vec<Registered>>,
    next_subscriber: AtomicU64,
    dispatch: ReentrantMutex<()>,
}

/// Shared, ordered, observable log of diagnostic events.
///
/// Cheap to clone; clones share the same buffer and subscribers. Construct one
/// per application and hand clones to whoever appends or observes.
#[derive(Clone)]
pub struct EventLog {
    inner: Arc<Inner>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventLog {
    /// Creates an unbounded log.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a log that keeps at most `capacity` events (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(Some(capacity.max(1)))
    }

    /// Creates a log sized by [`Config::log_capacity`] (`0` = unbounded).
    pub fn from_config(cfg: &Config) -> Self {
        Self::build(cfg.log_capacity_limit())
    }

    fn build(capacity: Option<usize>) -> Self {
        Self {
            inner: Arc::new(Inner {
                buffer: Mutex::new(Buffer {
                    events: VecDeque::new(),
                    capacity,
                    last_at: None,
                    version: 0,
                }),
                subscribers: Mutex::new(Vec::new()),
                next_subscriber: AtomicU64::new(0),
                dispatch: ReentrantMutex::new(()),
            }),
        }
    }

    /// Appends a new event and notifies every subscriber with the full list.
    ///
    /// Never fails. The returned event is a copy of what was stored.
    pub fn append(
        &self,
        kind: EventKind,
        message: impl Into<String>,
        data: Option<EventData>,
    ) -> LogEvent {
        let _dispatch = self.inner.dispatch.lock();
        let (event, snapshot, version) = {
            let mut buffer = self.inner.buffer.lock();
            let event = buffer.push(kind, message.into(), data);
            (event, buffer.snapshot(), buffer.version)
        };
        self.notify(&snapshot, version);
        event
    }

    /// Appends an event with any serializable payload.
    ///
    /// See [`LogEvent`] for how payloads are mapped; serialization errors are
    /// recorded in the payload instead of failing.
    pub fn append_with<S: Serialize + ?Sized>(
        &self,
        kind: EventKind,
        message: impl Into<String>,
        payload: &S,
    ) -> LogEvent {
        self.append(kind, message, to_event_data(payload))
    }

    /// Appends an `info` event without data.
    pub fn info(&self, message: impl Into<String>) -> LogEvent {
        self.append(EventKind::Info, message, None)
    }

    /// Appends a `warning` event without data.
    pub fn warning(&self, message: impl Into<String>) -> LogEvent {
        self.append(EventKind::Warning, message, None)
    }

    /// Appends an `error` event without data.
    pub fn error(&self, message: impl Into<String>) -> LogEvent {
        self.append(EventKind::Error, message, None)
    }

    /// Appends a `request` event without data.
    pub fn request(&self, message: impl Into<String>) -> LogEvent {
        self.append(EventKind::Request, message, None)
    }

    /// Appends a `response` event without data.
    pub fn response(&self, message: impl Into<String>) -> LogEvent {
        self.append(EventKind::Response, message, None)
    }

    /// Appends a `success` event without data.
    pub fn success(&self, message: impl Into<String>) -> LogEvent {
        self.append(EventKind::Success, message, None)
    }

    /// Appends a `sync` event without data.
    pub fn sync(&self, message: impl Into<String>) -> LogEvent {
        self.append(EventKind::Sync, message, None)
    }

    /// Returns a copy of the current events in insertion order.
    pub fn get_all(&self) -> Vec<LogEvent> {
        self.inner.buffer.lock().snapshot()
    }

    /// Removes every event and notifies subscribers with an empty list.
    ///
    /// Subscribers are notified even if the log was already empty.
    pub fn clear(&self) {
        let _dispatch = self.inner.dispatch.lock();
        let version = self.inner.buffer.lock().clear();
        self.notify(&[], version);
    }

    /// Registers a subscriber for every future change.
    ///
    /// Does not call the subscriber right away; use [`get_all`](Self::get_all)
    /// for the initial state.
    pub fn subscribe<S: Subscribe>(&self, subscriber: S) -> Subscription {
        self.subscribe_arc(Arc::new(subscriber))
    }

    /// Registers an already shared subscriber.
    ///
    /// The same `Arc` may be registered several times; each registration is
    /// independent.
    pub fn subscribe_arc(&self, subscriber: Arc<dyn Subscribe>) -> Subscription {
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .push(Registered { id, subscriber });
        Subscription {
            id,
            log: Arc::downgrade(&self.inner),
        }
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.inner.buffer.lock().events.len()
    }

    /// True if no events are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity (`None` = unbounded).
    pub fn capacity(&self) -> Option<usize> {
        self.inner.buffer.lock().capacity
    }

    /// Number of active registrations.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    /// Pretty JSON array of the current events.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.get_all())
    }

    /// Calls each subscriber with `events`, isolating panics.
    ///
    /// Caller must hold the dispatch lock. `version` is the buffer version
    /// `events` was taken at; if a subscriber changes the log, the nested
    /// call has already delivered the newer list to everyone and this one
    /// stops.
    fn notify(&self, events: &[LogEvent], version: u64) {
        let subscribers: Vec<Arc<dyn Subscribe>> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .map(|r| Arc::clone(&r.subscriber))
            .collect();

        for sub in subscribers {
            if self.inner.buffer.lock().version != version {
                return;
            }
            let call = AssertUnwindSafe(|| sub.on_change(events));
            if let Err(payload) = panic::catch_unwind(call) {
                tracing::warn!(
                    subscriber = sub.name(),
                    panic = %panic_message(payload.as_ref()),
                    "log subscriber panicked; continuing with remaining subscribers"
                );
            }
        }
    }
}

/// Handle returned by [`EventLog::subscribe`].
///
/// Dropping it does **not** unsubscribe; call [`unsubscribe`](Self::unsubscribe).
#[must_use = "keep the subscription to be able to unsubscribe"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    log: Weak<Inner>,
}

impl Subscription {
    /// Removes exactly this registration.
    ///
    /// Returns `false` if the log no longer exists. Takes effect for the next
    /// notification.
    pub fn unsubscribe(self) -> bool {
        let Some(inner) = self.log.upgrade() else {
            return false;
        };
        let mut subs = inner.subscribers.lock();
        let before = subs.len();
        subs.retain(|r| r.id != self.id);
        subs.len() != before
    }

    /// True while the registration exists.
    pub fn is_active(&self) -> bool {
        self.log
            .upgrade()
            .map(|inner| inner.subscribers.lock().iter().any(|r| r.id == self.id))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_append_returns_stored_copy() {
        let log = EventLog::new();
        let ev = log.append(EventKind::Request, "GET /api/health", None);
        assert_eq!(log.get_all(), vec![ev]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let log = EventLog::new();
        log.info("one");
        let mut snap = log.get_all();
        snap.clear();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let log = EventLog::with_capacity(3);
        for i in 0..5 {
            log.info(format!("event {i}"));
        }
        let msgs: Vec<String> = log.get_all().iter().map(|e| e.message().to_string()).collect();
        assert_eq!(msgs, vec!["event 2", "event 3", "event 4"]);
        assert_eq!(log.capacity(), Some(3));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let log = EventLog::with_capacity(0);
        log.info("a");
        log.info("b");
        assert_eq!(log.len(), 1);
        assert_eq!(log.get_all()[0].message(), "b");
    }

    #[test]
    fn test_from_config_unbounded_by_default() {
        let log = EventLog::from_config(&Config::default());
        assert_eq!(log.capacity(), None);
    }

    #[test]
    fn test_timestamps_and_ids_monotonic() {
        let log = EventLog::new();
        for i in 0..50 {
            log.sync(format!("{i}"));
        }
        let all = log.get_all();
        for pair in all.windows(2) {
            assert!(pair[0].id() < pair[1].id());
            assert!(pair[0].timestamp() <= pair[1].timestamp());
        }
    }

    #[test]
    fn test_reentrant_append_from_subscriber() {
        let log = EventLog::new();
        let inner_log = log.clone();
        let fired = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&fired);
        let _sub = log.subscribe(move |events: &[LogEvent]| {
            if events.len() == 1 && f.fetch_add(1, Ordering::SeqCst) == 0 {
                inner_log.warning("echo");
            }
        });

        let last_seen = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&last_seen);
        let _panel = log.subscribe(move |events: &[LogEvent]| {
            *seen.lock() = events.to_vec();
        });

        log.info("first");
        let kinds: Vec<EventKind> = log.get_all().iter().map(LogEvent::kind).collect();
        assert_eq!(kinds, vec![EventKind::Info, EventKind::Warning]);
        assert_eq!(*last_seen.lock(), log.get_all());
    }

    #[test]
    fn test_clear_inside_callback_leaves_everyone_empty() {
        let log = EventLog::new();
        let inner_log = log.clone();
        let _reset = log.subscribe(move |events: &[LogEvent]| {
            if events.len() == 3 {
                inner_log.clear();
            }
        });
        let last_len = Arc::new(AtomicUsize::new(usize::MAX));
        let l = Arc::clone(&last_len);
        let _panel = log.subscribe(move |events: &[LogEvent]| {
            l.store(events.len(), Ordering::SeqCst);
        });

        log.info("a");
        log.info("b");
        log.info("c");
        assert!(log.is_empty());
        assert_eq!(last_len.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_after_log_dropped() {
        let log = EventLog::new();
        let sub = log.subscribe(|_: &[LogEvent]| {});
        assert!(sub.is_active());
        drop(log);
        assert!(!sub.is_active());
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn test_to_json_array() {
        let log = EventLog::new();
        log.append_with(EventKind::Response, "200 OK", &serde_json::json!({"ms": 42}));
        let parsed: serde_json::Value = serde_json::from_str(&log.to_json().unwrap()).unwrap();
        assert_eq!(parsed[0]["type"], "response");
        assert_eq!(parsed[0]["data"]["ms"], 42);
    }
}
