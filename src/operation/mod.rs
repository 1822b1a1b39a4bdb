//! Retrying operations.
//!
//! Wraps an opaque async [`Producer`] with bounded sequential retries and
//! exposes the latest result, a loading flag and the terminal error.
//!
//! Internal modules:
//! - [`runner`]: executes one attempt and traces it;
//! - [`actor`]: runs one trigger sequence (attempts, waits, generation checks);
//! - [`handle`]: the caller-facing [`RetryableOperation`];
//! - [`builder`]: [`OperationBuilder`] for retries/delay/initial value;
//! - [`state`]: [`OperationState`], [`Phase`], [`Generation`];
//! - [`producer`]: [`Producer`], [`ProducerFn`], [`ProducerRef`].
//!
//! This module has no dependency on the event log; callers that want attempts
//! in the log record them from their own producer.

mod actor;
mod builder;
mod handle;
mod producer;
mod runner;
mod state;

pub use builder::OperationBuilder;
pub use handle::RetryableOperation;
pub use producer::{Producer, ProducerFn, ProducerRef};
pub use state::{Generation, OperationState, Phase};
