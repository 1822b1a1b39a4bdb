//! # faultline
//!
//! **faultline** is the resilience and diagnostics core of a client
//! application: operations that survive flaky backends, a shared diagnostic
//! log many views observe at once, and boundaries that turn fatal failures
//! into logged, recoverable fallbacks.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌───────────────────────┐        ┌──────────────────────────────────────┐
//!  │  RetryableOperation   │        │               EventLog               │
//!  │  (per call site)      │        │   (one per application, cloned)      │
//!  │                       │        │                                      │
//!  │  trigger()/refetch()  │        │  append() ─► [VecDeque<LogEvent>]    │
//!  │     └─► SequenceActor │        │  clear()          │                  │
//!  │          ├─ attempt   │        │                   ▼                  │
//!  │          ├─ wait      │        │        notify(full snapshot)         │
//!  │          └─ attempt.. │        │      ┌────────┼────────┐             │
//!  │  state: watch channel │        │      ▼        ▼        ▼             │
//!  │  {data, loading,      │        │   panel   sync view  LogWriter       │
//!  │   error, generation}  │        └──────────────▲───────────────────────┘
//!  └───────────────────────┘                       │ append(error, ..)
//!                                       ┌──────────┴──────────┐
//!                                       │   FailureBoundary   │
//!                                       │ catch ─► log once   │
//!                                       │       ─► fallback   │
//!                                       └─────────────────────┘
//! ```
//!
//! `RetryableOperation` and `EventLog` are independent; `FailureBoundary` is
//! the only piece that uses the log.
//!
//! ### Retry lifecycle
//! ```text
//! trigger() ─► generation += 1, loading = true, error = None
//!
//! loop {
//!   ├─► superseded by a newer trigger? ─► exit, touch nothing
//!   ├─► attempt += 1
//!   ├─► producer.produce()
//!   │       ├─ Ok(v)  ─► data = v, loading = false            (Success)
//!   │       └─ Err(e) ─► attempt == retries + 1 ?
//!   │                      ├─ yes ─► error = e, loading = false (Exhausted)
//!   │                      └─ no  ─► sleep(delay), continue     (WaitingRetry)
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types                                   |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Retry**         | Bounded sequential retries with last-trigger-wins state.     | [`RetryableOperation`], [`Producer`]        |
//! | **Policies**      | Retry count, fixed or growing delay, jitter.                 | [`RetryPolicy`], [`BackoffPolicy`]          |
//! | **Event log**     | Ordered diagnostic events with synchronous fan-out.          | [`EventLog`], [`LogEvent`], [`Subscribe`]   |
//! | **Boundaries**    | Catch, log once, serve fallback, reset.                      | [`FailureBoundary`], [`Outcome`]            |
//! | **Errors**        | Typed errors for boundaries and configuration.               | [`BoundaryError`], [`ConfigError`]          |
//! | **Configuration** | Centralized defaults.                                        | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], a subscriber mirroring log
//!   events into `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use faultline::{EventLog, LogEvent, ProducerFn, RetryableOperation};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let log = EventLog::new();
//!     let panel = log.subscribe(|events: &[LogEvent]| {
//!         println!("{} events captured", events.len());
//!     });
//!
//!     let fetch_log = log.clone();
//!     let op = RetryableOperation::builder(ProducerFn::new("status", move || {
//!         let log = fetch_log.clone();
//!         async move {
//!             log.request("GET /api/status");
//!             Ok::<_, String>("green")
//!         }
//!     }))
//!     .delay(Duration::from_millis(100))
//!     .start();
//!
//!     let state = op.settled().await;
//!     assert_eq!(state.data, Some("green"));
//!
//!     panel.unsubscribe();
//! }
//! ```
mod boundary;
mod config;
mod error;
mod events;
mod operation;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use boundary::{BoundaryBuilder, Failure, FailureBoundary, Outcome, ResetAction, ResetMode};
pub use config::Config;
pub use error::{BoundaryError, ConfigError};
pub use events::{EventData, EventKind, EventLog, LogEvent, Subscription};
pub use operation::{
    Generation, OperationBuilder, OperationState, Phase, Producer, ProducerFn, ProducerRef,
    RetryableOperation,
};
pub use policies::{BackoffPolicy, JitterPolicy, RetryPolicy};
pub use subscribers::Subscribe;

// Optional: built-in subscriber forwarding events to `tracing`.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
