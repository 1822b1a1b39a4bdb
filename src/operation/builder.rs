use std::time::Duration;

use crate::operation::handle::RetryableOperation;
use crate::operation::producer::ProducerRef;
use crate::policies::{BackoffPolicy, RetryPolicy};

/// Builder for a [`RetryableOperation`].
///
/// Defaults: 3 retries, fixed 1s delay, no initial value, triggered on start.
pub struct OperationBuilder<T, E> {
    producer: ProducerRef<T, E>,
    policy: RetryPolicy,
    initial: Option<T>,
    lazy: bool,
}

impl<T, E> OperationBuilder<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub(crate) fn new(producer: ProducerRef<T, E>) -> Self {
        Self {
            producer,
            policy: RetryPolicy::default(),
            initial: None,
            lazy: false,
        }
    }

    /// Value exposed as `data` before the first success.
    pub fn initial(mut self, value: T) -> Self {
        self.initial = Some(value);
        self
    }

    /// Retries after the first failed attempt.
    pub fn retries(mut self, retries: u32) -> Self {
        self.policy.retries = retries;
        self
    }

    /// Fixed delay between attempts.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.policy.backoff = BackoffPolicy::fixed(delay);
        self
    }

    /// Custom delay policy (growth, jitter).
    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.policy.backoff = backoff;
        self
    }

    /// Replaces retries and backoff at once.
    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Start in `Idle`; nothing runs until the first `trigger()`.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Builds the operation and, unless [`lazy`](Self::lazy), triggers it.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start(self) -> RetryableOperation<T, E> {
        RetryableOperation::launch(self.producer, self.policy, self.initial, !self.lazy)
    }
}
