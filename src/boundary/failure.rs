//! # Caught failures and the fallback view.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::BoundaryError;

/// A failure caught by a [`FailureBoundary`](crate::FailureBoundary).
#[derive(Debug, Clone)]
pub struct Failure {
    pub(crate) error: BoundaryError,
    pub(crate) detail: String,
    pub(crate) stack: String,
    pub(crate) boundary: String,
    pub(crate) caught_at: DateTime<Utc>,
}

impl Failure {
    /// Classification and message of the failure.
    pub fn error(&self) -> &BoundaryError {
        &self.error
    }

    /// One-line summary (the error message).
    pub fn summary(&self) -> &str {
        self.error.message()
    }

    /// Longer description (debug rendering of the error, or the panic text).
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Captured backtrace text; empty-ish unless `RUST_BACKTRACE` is set.
    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// Name of the boundary that caught it.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// When it was caught.
    pub fn caught_at(&self) -> DateTime<Utc> {
        self.caught_at
    }

    /// Renders the fallback screen text.
    ///
    /// Plain formatting only, so rendering the fallback cannot fail itself.
    pub fn render(&self, title: &str) -> String {
        format!(
            "{title}\n\n{summary}\n\nBoundary: {boundary}\nCaught at: {at}\n\nDetails:\n{detail}\n\nReload to continue.",
            summary = self.summary(),
            boundary = self.boundary,
            at = self.caught_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            detail = self.detail,
        )
    }

    /// Payload attached to the `error` log event.
    pub(crate) fn event_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("error".into(), Value::String(self.summary().to_string()));
        data.insert("kind".into(), Value::String(self.error.as_label().to_string()));
        data.insert("detail".into(), Value::String(self.detail.clone()));
        data.insert("stack".into(), Value::String(self.stack.clone()));
        data.insert("boundary".into(), Value::String(self.boundary.clone()));
        data
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.boundary, self.error)
    }
}

/// Result of running a guarded region.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The region completed normally.
    Rendered(T),
    /// The region failed now or earlier; show the fallback.
    Fallback(Arc<Failure>),
}

impl<T> Outcome<T> {
    /// True for [`Outcome::Fallback`].
    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback(_))
    }

    /// The rendered value, if any.
    pub fn rendered(self) -> Option<T> {
        match self {
            Outcome::Rendered(v) => Some(v),
            Outcome::Fallback(_) => None,
        }
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&Arc<Failure>> {
        match self {
            Outcome::Rendered(_) => None,
            Outcome::Fallback(f) => Some(f),
        }
    }
}
