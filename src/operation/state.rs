//! # Observable state of a retrying operation.
//!
//! ```text
//!            trigger()
//!   Idle ───────────────► Attempting ──ok──► Success
//!                            │  ▲
//!                      err   │  │ delay elapsed
//!                            ▼  │
//!                        WaitingRetry
//!                            │
//!                            └─ last attempt failed ─► Exhausted
//! ```
//!
//! ## Invariants
//! - `loading` is true exactly in `Attempting` and `WaitingRetry`.
//! - `loading` and `error` are never set together.
//! - Only the sequence whose [`Generation`] matches `generation` may write.

use std::fmt;
use std::sync::Arc;

/// Marker of one trigger sequence. Later triggers get larger generations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub(crate) u64);

impl Generation {
    /// Raw counter value (`0` = never triggered).
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the current sequence is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not triggered yet, or closed while waiting.
    Idle,
    /// Producer call outstanding.
    Attempting,
    /// Last attempt failed; waiting before the next one.
    WaitingRetry,
    /// Last sequence produced a value.
    Success,
    /// Last sequence used up every attempt.
    Exhausted,
}

impl Phase {
    /// True while a sequence is outstanding.
    #[inline]
    pub fn is_loading(self) -> bool {
        matches!(self, Phase::Attempting | Phase::WaitingRetry)
    }

    /// True for `Success` and `Exhausted`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Success | Phase::Exhausted)
    }
}

/// Snapshot of what a [`RetryableOperation`](crate::RetryableOperation) exposes.
pub struct OperationState<T, E> {
    /// Initial value or most recent success. Kept across later failures.
    pub data: Option<T>,
    /// True while an attempt or a retry wait is outstanding.
    pub loading: bool,
    /// Last failure of an exhausted sequence.
    pub error: Option<Arc<E>>,
    /// Current state machine position.
    pub phase: Phase,
    /// Attempts made by the sequence that last wrote this state.
    pub attempts: u32,
    /// Sequence that owns this state.
    pub generation: Generation,
}

impl<T, E> OperationState<T, E> {
    pub(crate) fn idle(initial: Option<T>) -> Self {
        Self {
            data: initial,
            loading: false,
            error: None,
            phase: Phase::Idle,
            attempts: 0,
            generation: Generation::default(),
        }
    }

    pub(crate) fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.loading = phase.is_loading();
        if self.loading {
            self.error = None;
        }
    }

    /// True once the last sequence produced a value.
    pub fn is_success(&self) -> bool {
        self.phase == Phase::Success
    }

    /// True once the last sequence ran out of attempts.
    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Exhausted
    }
}

impl<T: Clone, E> Clone for OperationState<T, E> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            loading: self.loading,
            error: self.error.clone(),
            phase: self.phase,
            attempts: self.attempts,
            generation: self.generation,
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for OperationState<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationState")
            .field("data", &self.data)
            .field("loading", &self.loading)
            .field("error", &self.error)
            .field("phase", &self.phase)
            .field("attempts", &self.attempts)
            .field("generation", &self.generation)
            .finish()
    }
}
