//! # Continuation Handle
//!
//! A continuation represents "the rest of the computation": a callable value
//! handed to a step, invoked with the step's outcome once that outcome
//! exists. Steps never return their results directly; they resume the
//! continuation, possibly from another thread.
//!
//! ## Exactly-Once Contract
//!
//! A continuation must be invoked exactly once per step activation.
//! [`Continuation::resume`] consumes the handle, so a second invocation
//! does not compile. The two remaining exits are [`Continuation::abandon`]
//! for the cancellation path, and a plain drop, which is traced.

use tracing::trace;

use crate::chain::ChainResult;

type ResumeFn<A> = Box<dyn FnOnce(ChainResult<A>) + Send>;

/// Move-only handle for delivering a step's outcome.
pub struct Continuation<A> {
    resume_fn: Option<ResumeFn<A>>,
}

impl<A: Send + 'static> Continuation<A> {
    pub fn new(f: impl FnOnce(ChainResult<A>) + Send + 'static) -> Self {
        Self {
            resume_fn: Some(Box::new(f)),
        }
    }

    /// Delivers the outcome. Consumes the handle, so a continuation cannot
    /// be resumed twice.
    pub fn resume(mut self, outcome: ChainResult<A>) {
        if let Some(f) = self.resume_fn.take() {
            f(outcome);
        }
    }

    /// Discards the handle without delivering anything. Used when a chain
    /// is cancelled before its next unit of work is issued: the caller's
    /// continuation is then never invoked.
    pub fn abandon(mut self) {
        if self.resume_fn.take().is_some() {
            trace!("continuation abandoned");
        }
    }
}

impl<A> Drop for Continuation<A> {
    fn drop(&mut self) {
        if self.resume_fn.is_some() {
            trace!("continuation dropped without resume");
        }
    }
}
