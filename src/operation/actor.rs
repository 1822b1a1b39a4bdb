//! # SequenceActor: one trigger sequence of a retrying operation.
//!
//! Runs attempts of a producer until one succeeds or the [`RetryPolicy`]
//! runs out, writing progress into the shared state **only while its
//! generation is current**.
//!
//! ## Architecture
//! ```text
//! RetryableOperation::trigger() ──► tokio::spawn(SequenceActor::run())
//!
//! loop {
//!   ├─► stale or closed? → exit without writing
//!   ├─► attempt += 1, state ← Attempting
//!   ├─► run_once() ─────► producer.produce()
//!   │       │
//!   │       ├─ Ok(v)  ──► state ← Success{data: v}, exit
//!   │       └─ Err(e) / panic ──► policy.delay_after(attempt)
//!   │                      ├─ None        ─► state ← Exhausted{error: e}, exit
//!   │                      │                 (Idle if the last attempt panicked)
//!   │                      └─ Some(delay) ─► state ← WaitingRetry
//!   │                                        sleep(delay) (cancellable by teardown)
//! }
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially** within one actor.
//! - A superseded actor is not aborted: its in-flight attempt or sleep runs
//!   out, the outcome is dropped, and no further attempt is started.
//! - A panicking attempt counts as a failed one. A panic has no `E` to
//!   report, so when it is the last attempt the state goes back to `Idle`.
//! - Teardown (last handle dropped / `close()`) stops the actor at the retry
//!   sleep and returns the state to `Idle`.

use std::sync::Arc;

use tokio::{select, time};

use crate::operation::handle::Shared;
use crate::operation::runner::{run_once, Attempt};
use crate::operation::state::{Generation, Phase};

pub(crate) struct SequenceActor<T, E> {
    shared: Arc<Shared<T, E>>,
    generation: Generation,
}

impl<T, E> SequenceActor<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub(crate) fn new(shared: Arc<Shared<T, E>>, generation: Generation) -> Self {
        Self { shared, generation }
    }

    /// Runs the sequence to completion, supersession or teardown.
    pub(crate) async fn run(self) {
        let policy = self.shared.policy;
        let name = self.shared.producer.name().to_string();
        let mut attempt: u32 = 0;

        loop {
            if self.shared.is_closed() {
                self.shared.apply(self.generation, |s| s.enter(Phase::Idle));
                return;
            }
            if self.shared.is_stale(self.generation) {
                tracing::trace!(operation = %name, generation = %self.generation, "sequence superseded");
                return;
            }

            attempt = attempt.saturating_add(1);
            self.shared.apply(self.generation, |s| {
                s.attempts = attempt;
                s.enter(Phase::Attempting);
            });

            let err = match run_once(self.shared.producer.as_ref(), self.generation, attempt).await {
                Attempt::Produced(value) => {
                    let applied = self.shared.apply(self.generation, |s| {
                        s.data = Some(value);
                        s.error = None;
                        s.enter(Phase::Success);
                    });
                    if !applied {
                        tracing::trace!(operation = %name, generation = %self.generation, "stale success discarded");
                    }
                    return;
                }
                Attempt::Failed(err) => Some(err),
                Attempt::Panicked => None,
            };

            match policy.delay_after(attempt) {
                None => {
                    let applied = self.shared.apply(self.generation, |s| match err {
                        Some(err) => {
                            s.error = Some(Arc::new(err));
                            s.enter(Phase::Exhausted);
                        }
                        None => s.enter(Phase::Idle),
                    });
                    if applied {
                        tracing::warn!(
                            operation = %name,
                            generation = %self.generation,
                            attempts = attempt,
                            "retries exhausted"
                        );
                    }
                    return;
                }
                Some(delay) => {
                    drop(err);
                    self.shared
                        .apply(self.generation, |s| s.enter(Phase::WaitingRetry));

                    let sleep = time::sleep(delay);
                    tokio::pin!(sleep);
                    select! {
                        _ = &mut sleep => {}
                        _ = self.shared.token.cancelled() => {}
                    }
                }
            }
        }
    }
}
