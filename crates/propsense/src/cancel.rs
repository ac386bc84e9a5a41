//! Cooperative cancellation.
//!
//! Long-running steps (parsing, validation, code actions) poll a
//! [`CancelChecker`] at well-defined points and bail out with [`Cancelled`]
//! as soon as it fires. Cancellation is not an error condition for callers: it
//! means the result is no longer wanted, usually because the document changed.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use thiserror::Error;

/// Returned when a computation was abandoned because its [`CancelChecker`]
/// fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the request was cancelled")]
pub struct Cancelled;

/// A cancellation predicate polled by the parser and the engines.
pub trait CancelChecker {
    /// Returns `true` once the current computation should stop.
    fn is_cancelled(&self) -> bool;

    /// Returns `Err(Cancelled)` if [`is_cancelled`](Self::is_cancelled).
    ///
    /// # Errors
    ///
    /// Fails with [`Cancelled`] when the checker has fired.
    fn check_cancelled(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A checker that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelChecker for NeverCancel {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F: Fn() -> bool> CancelChecker for F {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// A shareable flag that can be tripped from another thread.
///
/// ```rust
/// use propsense::{CancelChecker, CancellationToken};
///
/// let token = CancellationToken::new();
/// let for_worker = token.clone();
/// token.cancel();
/// assert!(for_worker.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that has not fired yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the token. Every clone observes the change.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

impl CancelChecker for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
