//! # Diagnostic events recorded by the [`EventLog`](crate::EventLog).
//!
//! The [`EventKind`] enum is the closed set of event types consumers know how
//! to style: `info`, `warning`, `error`, `request`, `response`, `success`,
//! `sync`. The kind carries no behavior inside the crate.
//!
//! A [`LogEvent`] is created only by the log, at append time, and is never
//! mutated afterwards: fields are private and exposed through accessors.
//!
//! ## Ordering guarantees
//! - `id` comes from a process-wide counter and strictly increases in
//!   insertion order, across every log in the process.
//! - `timestamp` is taken by the log under its lock and never goes backwards
//!   within one log, even if the wall clock does.
//!
//! ## JSON shape
//! ```text
//! {"id":7,"type":"error","message":"DB timeout","data":{"table":"users"},"timestamp":"2026-10-17T09:41:02.318Z"}
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Structured payload attached to an event.
pub type EventData = Map<String, Value>;

/// Global id counter for events.
static EVENT_ID: AtomicU64 = AtomicU64::new(1);

/// Classification of diagnostic events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// General information.
    Info,
    /// Something unexpected but recoverable.
    Warning,
    /// A failure.
    Error,
    /// An outgoing request was issued.
    Request,
    /// A response came back.
    Response,
    /// An operation completed successfully.
    Success,
    /// Synchronization activity.
    Sync,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 7] = [
        EventKind::Info,
        EventKind::Warning,
        EventKind::Error,
        EventKind::Request,
        EventKind::Response,
        EventKind::Success,
        EventKind::Sync,
    ];

    /// Lowercase label, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Info => "info",
            EventKind::Warning => "warning",
            EventKind::Error => "error",
            EventKind::Request => "request",
            EventKind::Response => "response",
            EventKind::Success => "success",
            EventKind::Sync => "sync",
        }
    }

    /// Parses a label produced by [`as_str`](Self::as_str).
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == label)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnostic event.
///
/// Only an [`EventLog`](crate::EventLog) creates events, so ids are never
/// reused and messages are never empty. Events serialize to JSON for export
/// but cannot be built back from it:
///
/// ```compile_fail
/// let ev: faultline::LogEvent = serde_json::from_str(r#"{"id":1,"type":"info","message":"","timestamp":"2026-10-17T09:41:02.318Z"}"#).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    id: u64,
    #[serde(rename = "type")]
    kind: EventKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<EventData>,
    #[serde(serialize_with = "serialize_millis")]
    timestamp: DateTime<Utc>,
}

impl LogEvent {
    /// Creates an event with the next global id.
    ///
    /// An empty message is replaced with the kind label.
    pub(crate) fn new(
        kind: EventKind,
        message: String,
        data: Option<EventData>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let message = if message.trim().is_empty() {
            kind.as_str().to_string()
        } else {
            message
        };
        Self {
            id: EVENT_ID.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            message,
            data,
            timestamp,
        }
    }

    /// Process-unique identifier.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Event classification.
    #[inline]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Human-readable message (never empty).
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attached payload, if any.
    #[inline]
    pub fn data(&self) -> Option<&EventData> {
        self.data.as_ref()
    }

    /// Creation instant.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// ISO-8601 timestamp with millisecond precision, e.g. `2026-10-17T09:41:02.318Z`.
    pub fn iso_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Short `HH:MM:SS` form for compact views.
    pub fn short_time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }

    /// Pretty-printed payload for detail views.
    pub fn data_pretty(&self) -> Option<String> {
        self.data
            .as_ref()
            .and_then(|d| serde_json::to_string_pretty(d).ok())
    }
}

impl fmt::Display for LogEvent {
    /// `[HH:MM:SS] kind message`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.short_time(), self.kind, self.message)
    }
}

fn serialize_millis<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Converts any serializable payload into event data.
///
/// Objects are kept as is, `null` becomes no data, other values are wrapped
/// as `{"value": ..}`. Serialization failures never propagate: they produce
/// `{"unserializable": "<reason>"}`.
pub(crate) fn to_event_data<S: Serialize + ?Sized>(payload: &S) -> Option<EventData> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => Some(map),
        Ok(Value::Null) => None,
        Ok(other) => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            Some(map)
        }
        Err(e) => {
            let mut map = Map::new();
            map.insert("unserializable".to_string(), Value::String(e.to_string()));
            Some(map)
        }
    }
}
