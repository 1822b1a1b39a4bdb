//! # RetryableOperation: caller-facing handle.
//!
//! Owns the watched [`OperationState`] and starts a [`SequenceActor`] per
//! trigger. Exposes the `{data, loading, error, refetch}` contract.
//!
//! ## Generation tagging
//! ```text
//! trigger() #1 ──► actor #1 ── slow producer ─────────────────► Ok(a)  (dropped: stale)
//! trigger() #2 ──► actor #2 ── fast producer ──► Ok(b) ─► state.data = b
//! ```
//! The generation check and the write happen inside one
//! `watch::Sender::send_if_modified` call, so a stale completion can never
//! slip in between.
//!
//! ## Teardown
//! Handles are cheap clones. When the last one is dropped (or
//! [`close`](RetryableOperation::close) is called) a cancellation token fires;
//! sequences waiting between attempts stop there.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::config::Config;
use crate::operation::actor::SequenceActor;
use crate::operation::builder::OperationBuilder;
use crate::operation::producer::{Producer, ProducerRef};
use crate::operation::state::{Generation, OperationState, Phase};
use crate::policies::RetryPolicy;

/// State shared between the handle and its running sequences.
pub(crate) struct Shared<T, E> {
    pub(crate) producer: ProducerRef<T, E>,
    pub(crate) policy: RetryPolicy,
    pub(crate) token: CancellationToken,
    state: watch::Sender<OperationState<T, E>>,
    generation: AtomicU64,
}

impl<T, E> Shared<T, E> {
    /// Applies `f` if `generation` still owns the state. Returns whether it did.
    pub(crate) fn apply(
        &self,
        generation: Generation,
        f: impl FnOnce(&mut OperationState<T, E>),
    ) -> bool {
        self.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            f(s);
            true
        })
    }

    pub(crate) fn is_stale(&self, generation: Generation) -> bool {
        self.state.borrow().generation != generation
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Retrying wrapper around a [`Producer`].
///
/// Must be created inside a Tokio runtime: sequences run on `tokio::spawn`.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use faultline::{ProducerFn, RetryableOperation};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let op = RetryableOperation::builder(ProducerFn::new("users", || async {
///     Ok::<_, String>(vec!["alice", "bob"])
/// }))
/// .retries(2)
/// .delay(Duration::from_millis(100))
/// .start();
///
/// let state = op.settled().await;
/// assert!(!state.loading);
/// assert_eq!(state.data, Some(vec!["alice", "bob"]));
/// # }
/// ```
pub struct RetryableOperation<T, E> {
    shared: Arc<Shared<T, E>>,
    _teardown: Arc<DropGuard>,
}

impl<T, E> Clone for RetryableOperation<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            _teardown: Arc::clone(&self._teardown),
        }
    }
}

impl<T: Send + 'static, E: Send + 'static> std::fmt::Debug for RetryableOperation<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("RetryableOperation")
            .field("name", &self.shared.producer.name())
            .field("phase", &state.phase)
            .field("generation", &state.generation)
            .field("attempts", &state.attempts)
            .finish()
    }
}

impl<T, E> RetryableOperation<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Starts configuring an operation around `producer`.
    pub fn builder<P>(producer: P) -> OperationBuilder<T, E>
    where
        P: Producer<Output = T, Error = E>,
    {
        OperationBuilder::new(Arc::new(producer))
    }

    /// Starts configuring an operation around an already shared producer.
    pub fn builder_ref(producer: ProducerRef<T, E>) -> OperationBuilder<T, E> {
        OperationBuilder::new(producer)
    }

    /// Creates the operation with default policy and triggers it right away.
    pub fn new<P>(producer: P) -> Self
    where
        P: Producer<Output = T, Error = E>,
    {
        Self::builder(producer).start()
    }

    /// Creates the operation with retry settings from `cfg` and triggers it.
    pub fn from_config<P>(producer: P, cfg: &Config) -> Self
    where
        P: Producer<Output = T, Error = E>,
    {
        Self::builder(producer).policy(cfg.retry_policy()).start()
    }

    pub(crate) fn launch(
        producer: ProducerRef<T, E>,
        policy: RetryPolicy,
        initial: Option<T>,
        immediate: bool,
    ) -> Self {
        let token = CancellationToken::new();
        let (state, _rx) = watch::channel(OperationState::idle(initial));
        let op = Self {
            shared: Arc::new(Shared {
                producer,
                policy,
                token: token.clone(),
                state,
                generation: AtomicU64::new(0),
            }),
            _teardown: Arc::new(token.drop_guard()),
        };
        if immediate {
            op.trigger();
        }
        op
    }

    /// Starts a new attempt sequence and returns its generation.
    ///
    /// Sets `loading` and clears `error` synchronously. Any sequence already
    /// running keeps going but can no longer change the state. After
    /// [`close`](Self::close) this is a no-op returning the current generation.
    pub fn trigger(&self) -> Generation {
        if self.shared.is_closed() {
            tracing::debug!(
                operation = self.shared.producer.name(),
                "trigger ignored: operation closed"
            );
            return self.generation();
        }

        let generation =
            Generation(self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1);
        let owns = self.shared.state.send_if_modified(|s| {
            if generation <= s.generation {
                return false;
            }
            s.generation = generation;
            s.attempts = 0;
            s.enter(Phase::Attempting);
            true
        });
        if owns {
            let actor = SequenceActor::new(Arc::clone(&self.shared), generation);
            tokio::spawn(actor.run());
        }
        generation
    }

    /// Alias of [`trigger`](Self::trigger) for manual retry buttons.
    pub fn refetch(&self) -> Generation {
        self.trigger()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> OperationState<T, E> {
        self.shared.state.borrow().clone()
    }

    /// Most recent successful value (or the initial one).
    pub fn data(&self) -> Option<T> {
        self.shared.state.borrow().data.clone()
    }

    /// True while a sequence is outstanding.
    pub fn loading(&self) -> bool {
        self.shared.state.borrow().loading
    }

    /// Failure of the last exhausted sequence.
    pub fn error(&self) -> Option<Arc<E>> {
        self.shared.state.borrow().error.clone()
    }

    /// Current state machine position.
    pub fn phase(&self) -> Phase {
        self.shared.state.borrow().phase
    }

    /// Generation that currently owns the state.
    pub fn generation(&self) -> Generation {
        self.shared.state.borrow().generation
    }

    /// Name of the wrapped producer.
    pub fn name(&self) -> &str {
        self.shared.producer.name()
    }

    /// Retry policy in use.
    pub fn policy(&self) -> RetryPolicy {
        self.shared.policy
    }

    /// Receiver notified on every state change.
    pub fn watch(&self) -> watch::Receiver<OperationState<T, E>> {
        self.shared.state.subscribe()
    }

    /// Waits until no sequence is outstanding and returns that state.
    ///
    /// Returns immediately for an idle or settled operation.
    pub async fn settled(&self) -> OperationState<T, E> {
        let mut rx = self.shared.state.subscribe();
        let settled = match rx.wait_for(|s| !s.loading).await {
            Ok(state) => Some((*state).clone()),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| self.state())
    }

    /// Stops sequences at their next retry wait and ignores future triggers.
    ///
    /// An in-flight producer call is not aborted.
    pub fn close(&self) {
        self.shared.token.cancel();
    }

    /// True after [`close`](Self::close).
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}
