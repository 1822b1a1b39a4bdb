//! # Event log subscribers.
//!
//! This module provides the [`Subscribe`] trait and the built-in
//! [`LogWriter`] for observing the [`EventLog`](crate::EventLog).
//!
//! ## Architecture
//! ```text
//! EventLog::append / clear
//!     │
//!     └──► notify(&[LogEvent])  (synchronous, registration order)
//!              │
//!              ├──► Subscribe::on_change   (panic caught → tracing::warn)
//!              │         │
//!              │    ┌────┴─────┬──────────┬────────┐
//!              │    ▼          ▼          ▼        ▼
//!              │  LogWriter  panel     sync view  closures
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
