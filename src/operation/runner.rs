//! # Run a single attempt of a producer.
//!
//! Calls the producer once and records the outcome with `tracing`. The
//! result is returned untouched; classification and retry decisions belong to
//! the sequence actor.
//!
//! ## Rules
//! - Exactly **one** `produce()` call per invocation.
//! - Failures are logged at `debug`: they are transient until the actor says otherwise.
//! - A panic inside the producer is caught and reported as
//!   [`Attempt::Panicked`]; it never takes down the sequence task.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::panic_message;
use crate::operation::producer::Producer;
use crate::operation::state::Generation;

/// Outcome of one attempt.
pub(crate) enum Attempt<T, E> {
    Produced(T),
    Failed(E),
    Panicked,
}

/// Executes one attempt of `producer`.
pub(crate) async fn run_once<P>(
    producer: &P,
    generation: Generation,
    attempt: u32,
) -> Attempt<P::Output, P::Error>
where
    P: Producer + ?Sized,
{
    tracing::debug!(
        operation = producer.name(),
        %generation,
        attempt,
        "attempt starting"
    );

    match AssertUnwindSafe(producer.produce()).catch_unwind().await {
        Ok(Ok(value)) => {
            tracing::debug!(
                operation = producer.name(),
                %generation,
                attempt,
                "attempt succeeded"
            );
            Attempt::Produced(value)
        }
        Ok(Err(err)) => {
            tracing::debug!(
                operation = producer.name(),
                %generation,
                attempt,
                "attempt failed"
            );
            Attempt::Failed(err)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(
                operation = producer.name(),
                %generation,
                attempt,
                panic = %message,
                "producer panicked"
            );
            Attempt::Panicked
        }
    }
}
