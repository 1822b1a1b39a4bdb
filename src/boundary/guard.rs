//! # FailureBoundary: supervised region with a non-failing fallback.
//!
//! ## Flow
//! ```text
//! run(region)
//!   ├─ tripped?  ──yes──► Outcome::Fallback(same failure)      (region not run, nothing logged)
//!   └─ no ──► catch_unwind(region)
//!               ├─ Ok(Ok(v))  ──► Outcome::Rendered(v)
//!               ├─ Ok(Err(e)) ──┐
//!               └─ Err(panic) ──┴─► trip: store Failure
//!                                     └─► log.append(error, summary, {error, detail, stack, ..})
//!                                     └─► Outcome::Fallback(failure)
//!
//! reset()
//!   ├─► clear tripped state
//!   ├─► log.append(info, "reset ..")
//!   └─► ResetAction::Reload (default) | ResetAction::Resume (in-place)
//! ```
//!
//! ## Rules
//! - Each failure that trips the boundary is logged **exactly once**.
//! - While tripped the region is never executed again.
//! - Panics are caught with `AssertUnwindSafe`: state shared with the region
//!   may be left half-updated, which is why `Reload` is the default reset.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::failure::{Failure, Outcome};
use crate::error::BoundaryError;
use crate::events::{EventKind, EventLog};

/// Default fallback title.
const DEFAULT_TITLE: &str = "Something went wrong";

/// What `reset()` does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResetMode {
    /// Ask the host to rebuild everything (full reload).
    #[default]
    Reload,
    /// Resume the region in place.
    InPlace,
}

/// Instruction returned by [`FailureBoundary::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetAction {
    /// Host should tear down and rebuild the whole application.
    Reload,
    /// Host may render the region again right away.
    Resume,
}

impl ResetAction {
    /// Short label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetAction::Reload => "reload",
            ResetAction::Resume => "resume",
        }
    }
}

/// Builder for [`FailureBoundary`].
pub struct BoundaryBuilder {
    log: EventLog,
    name: Cow<'static, str>,
    mode: ResetMode,
    title: Cow<'static, str>,
}

impl BoundaryBuilder {
    /// Name recorded with every failure (default `"root"`).
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Reset behavior (default [`ResetMode::Reload`]).
    pub fn reset_mode(mut self, mode: ResetMode) -> Self {
        self.mode = mode;
        self
    }

    /// Title shown on the fallback view.
    pub fn fallback_title(mut self, title: impl Into<Cow<'static, str>>) -> Self {
        self.title = title.into();
        self
    }

    /// Builds the boundary.
    pub fn build(self) -> FailureBoundary {
        FailureBoundary {
            log: self.log,
            name: self.name,
            mode: self.mode,
            title: self.title,
            tripped: Mutex::new(None),
        }
    }
}

/// Guards a region: logs its first failure and serves a fallback until reset.
///
/// # Example
/// ```rust
/// use faultline::{EventKind, EventLog, FailureBoundary, ResetAction};
///
/// let log = EventLog::new();
/// let boundary = FailureBoundary::new(log.clone());
///
/// let out = boundary.run(|| -> Result<u32, String> { Err("render failed".into()) });
/// assert!(out.is_fallback());
/// assert_eq!(log.get_all()[0].kind(), EventKind::Error);
///
/// assert_eq!(boundary.reset(), ResetAction::Reload);
/// assert!(!boundary.is_tripped());
/// ```
pub struct FailureBoundary {
    log: EventLog,
    name: Cow<'static, str>,
    mode: ResetMode,
    title: Cow<'static, str>,
    tripped: Mutex<Option<Arc<Failure>>>,
}

impl Debug for FailureBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureBoundary")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("tripped", &self.is_tripped())
            .finish()
    }
}

impl FailureBoundary {
    /// Boundary named `"root"` with full-reload reset.
    pub fn new(log: EventLog) -> Self {
        Self::builder(log).build()
    }

    /// Starts configuring a boundary that reports to `log`.
    pub fn builder(log: EventLog) -> BoundaryBuilder {
        BoundaryBuilder {
            log,
            name: Cow::Borrowed("root"),
            mode: ResetMode::default(),
            title: Cow::Borrowed(DEFAULT_TITLE),
        }
    }

    /// Runs `region` unless tripped; intercepts errors and panics.
    pub fn run<T, E, F>(&self, region: F) -> Outcome<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display + Debug,
    {
        if let Some(failure) = self.failure() {
            return Outcome::Fallback(failure);
        }
        match panic::catch_unwind(AssertUnwindSafe(region)) {
            Ok(Ok(value)) => Outcome::Rendered(value),
            Ok(Err(err)) => Outcome::Fallback(self.trip_error(&err)),
            Err(payload) => Outcome::Fallback(self.trip_panic(payload.as_ref())),
        }
    }

    /// Async variant of [`run`](Self::run).
    ///
    /// `region` is only called (and its future only polled) when the
    /// boundary is healthy.
    pub async fn run_async<T, E, F, Fut>(&self, region: F) -> Outcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display + Debug,
    {
        if let Some(failure) = self.failure() {
            return Outcome::Fallback(failure);
        }
        let caught = AssertUnwindSafe(async move { region().await })
            .catch_unwind()
            .await;
        match caught {
            Ok(Ok(value)) => Outcome::Rendered(value),
            Ok(Err(err)) => Outcome::Fallback(self.trip_error(&err)),
            Err(payload) => Outcome::Fallback(self.trip_panic(payload.as_ref())),
        }
    }

    /// Clears the tripped state, logs an `info` event and says what the host
    /// should do next.
    pub fn reset(&self) -> ResetAction {
        let previous = self.tripped.lock().take();
        let action = match self.mode {
            ResetMode::Reload => ResetAction::Reload,
            ResetMode::InPlace => ResetAction::Resume,
        };

        let mut data = Map::new();
        data.insert("boundary".into(), Value::String(self.name.to_string()));
        data.insert("action".into(), Value::String(action.as_str().to_string()));
        if let Some(failure) = &previous {
            data.insert(
                "previous_error".into(),
                Value::String(failure.summary().to_string()),
            );
        }
        self.log.append(
            EventKind::Info,
            format!("{}: reset requested ({})", self.name, action.as_str()),
            Some(data),
        );
        tracing::info!(boundary = %self.name, action = action.as_str(), "boundary reset");
        action
    }

    /// Failure being served, if tripped.
    pub fn failure(&self) -> Option<Arc<Failure>> {
        self.tripped.lock().clone()
    }

    /// True while the fallback is being served.
    pub fn is_tripped(&self) -> bool {
        self.tripped.lock().is_some()
    }

    /// Fallback view text, if tripped.
    pub fn fallback_view(&self) -> Option<String> {
        self.failure().map(|f| f.render(&self.title))
    }

    /// Boundary name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured reset mode.
    pub fn reset_mode(&self) -> ResetMode {
        self.mode
    }

    fn trip_error<E: Display + Debug>(&self, err: &E) -> Arc<Failure> {
        let error = BoundaryError::Errored {
            message: err.to_string(),
        };
        self.trip(error, format!("{err:?}"))
    }

    fn trip_panic(&self, payload: &(dyn std::any::Any + Send)) -> Arc<Failure> {
        let error = BoundaryError::from_panic(payload);
        let detail = format!("panic in {}: {}", self.name, error.message());
        self.trip(error, detail)
    }

    /// Stores the failure and logs it, unless another failure tripped first.
    fn trip(&self, error: BoundaryError, detail: String) -> Arc<Failure> {
        let failure = Arc::new(Failure {
            error,
            detail,
            stack: Backtrace::capture().to_string(),
            boundary: self.name.to_string(),
            caught_at: Utc::now(),
        });

        {
            let mut tripped = self.tripped.lock();
            if let Some(existing) = tripped.as_ref() {
                return Arc::clone(existing);
            }
            *tripped = Some(Arc::clone(&failure));
        }

        tracing::error!(
            boundary = %self.name,
            kind = failure.error.as_label(),
            "{}",
            failure.summary()
        );
        self.log.append(
            EventKind::Error,
            failure.summary().to_string(),
            Some(failure.event_data()),
        );
        failure
    }
}
