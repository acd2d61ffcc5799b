//! # Bind Combinator and Chain Construction
//!
//! [`Bound`] composes a step with a function producing its successor. The
//! composition law is the whole mechanism:
//!
//! ```text
//! Bound(S, next).drive(k)  ==  S.drive(a -> next(a).drive(k))
//! ```
//!
//! Driving the composed step drives the predecessor with a continuation
//! that, on success, builds and drives the next step with the original
//! continuation. Nesting left or right produces the same observable
//! behavior.
//!
//! [`ChainBuilder`] is the fluent surface over `bind`, producing a
//! [`Chain`] (root step plus cancel token and correlation id) ready for a
//! driver.

use std::sync::Arc;

use tracing::{debug, trace};
use uuid::Uuid;

use crate::{cancellation::CancelToken, continuation::Continuation};

use super::step::{ApiCall, BoxStep, ChainContext, ChainResult, Step, Terminal};

/// Chain correlation identifier (uuid v4 string).
pub type ChainId = String;

/// Composition of a step with a function producing its successor.
///
/// On success the predecessor's value feeds `next`. On failure the chain
/// short-circuits: `next` is never evaluated and the failure is forwarded
/// to the outer continuation unchanged.
pub struct Bound<A, B> {
    inner: BoxStep<A>,
    next: Box<dyn FnOnce(A) -> BoxStep<B> + Send>,
}

impl<A: Send + 'static, B: Send + 'static> Bound<A, B> {
    pub fn new(inner: BoxStep<A>, next: impl FnOnce(A) -> BoxStep<B> + Send + 'static) -> Self {
        Self {
            inner,
            next: Box::new(next),
        }
    }
}

impl<A: Send + 'static, B: Send + 'static> Step<B> for Bound<A, B> {
    fn drive(self: Box<Self>, k: Continuation<B>) {
        let Bound { inner, next } = *self;
        inner.drive(Continuation::new(move |outcome| match outcome {
            Ok(value) => next(value).drive(k),
            // 失敗時はnextを評価せずそのまま伝播する
            Err(e) => k.resume(Err(e)),
        }));
    }
}

/// Binds `step` into `next`, boxed.
pub fn bind<A, B>(
    step: BoxStep<A>,
    next: impl FnOnce(A) -> BoxStep<B> + Send + 'static,
) -> BoxStep<B>
where
    A: Send + 'static,
    B: Send + 'static,
{
    Box::new(Bound::new(step, next))
}

/// A fully constructed chain: the root step plus the shared cancel token
/// and a correlation id for driver bookkeeping.
pub struct Chain<A: Send + 'static> {
    id: ChainId,
    cancel: CancelToken,
    root: BoxStep<A>,
}

impl<A: Send + 'static> Chain<A> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Starts the chain. `k` is invoked exactly once when the chain
    /// completes, unless the chain is cancelled before its next unit of
    /// work is issued, in which case `k` is never invoked.
    ///
    /// A unit of work that never completes stalls the chain permanently;
    /// drive through a [`ChainDriver`](crate::driver::ChainDriver) to put a
    /// timeout on top of this call.
    pub fn drive(self, k: Continuation<A>) {
        debug!(chain_id = %self.id, "driving chain");
        self.root.drive(k);
    }
}

/// Typed fluent construction of a chain.
///
/// Entry points fix the first step; `then`, `then_call` and `map` extend the
/// chain through `bind`; `build` seals it with a fresh correlation id.
/// Construction is synchronous and performs no work.
pub struct ChainBuilder<A: Send + 'static> {
    context: Arc<ChainContext>,
    root: BoxStep<A>,
}

impl<A: Send + 'static> ChainBuilder<A> {
    /// Starts a chain that resolves immediately with `value`.
    pub fn terminal(context: Arc<ChainContext>, value: A) -> Self {
        Self {
            root: Terminal::boxed(value),
            context,
        }
    }

    /// Starts a chain with one api call producing `operation`'s payload.
    pub fn call(
        context: Arc<ChainContext>,
        operation: impl FnOnce() -> ChainResult<A> + Send + 'static,
    ) -> Self {
        Self {
            root: ApiCall::boxed(context.clone(), operation),
            context,
        }
    }

    /// Starts from an already constructed step.
    pub fn from_step(context: Arc<ChainContext>, root: BoxStep<A>) -> Self {
        Self { context, root }
    }

    /// Binds the chain so far into `next`.
    pub fn then<B: Send + 'static>(
        self,
        next: impl FnOnce(A) -> BoxStep<B> + Send + 'static,
    ) -> ChainBuilder<B> {
        ChainBuilder {
            root: bind(self.root, next),
            context: self.context,
        }
    }

    /// Binds into a further api call fed with the predecessor's value.
    pub fn then_call<B: Send + 'static>(
        self,
        operation: impl FnOnce(A) -> ChainResult<B> + Send + 'static,
    ) -> ChainBuilder<B> {
        let context = self.context.clone();
        self.then(move |value| ApiCall::boxed(context, move || operation(value)))
    }

    /// Transforms the value without issuing new work.
    pub fn map<B: Send + 'static>(
        self,
        f: impl FnOnce(A) -> B + Send + 'static,
    ) -> ChainBuilder<B> {
        self.then(move |value| Terminal::boxed(f(value)))
    }

    pub fn build(self) -> Chain<A> {
        let id = Uuid::new_v4().to_string();
        trace!(chain_id = %id, "chain built");
        Chain {
            id,
            cancel: self.context.cancel.clone(),
            root: self.root,
        }
    }
}

impl ChainBuilder<String> {
    /// Starts a bounded loop of `iterations` async units.
    pub fn bounded_loop(context: Arc<ChainContext>, iterations: u32) -> Self {
        let root = super::loop_step::BoundedLoop::boxed(context.clone(), iterations);
        Self { context, root }
    }
}
