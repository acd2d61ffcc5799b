//! # Async Steps
//!
//! A step is a unit of work that delivers its result by resuming a
//! [`Continuation`] instead of returning it. The base cases live here:
//! [`Terminal`] resolves synchronously with a fixed value, [`ApiCall`]
//! offloads one unit of provider work and resumes from wherever that work
//! completes. Composition is the combinator module's job.

use std::sync::Arc;

use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    cancellation::CancelToken,
    continuation::Continuation,
    provider::{AsyncApi, Spawner},
};

/// Errors delivered through a chain's continuations.
///
/// Failures travel as values inside the continuation argument, never by
/// unwinding: a chain may complete on another thread, where a panic would be
/// lost.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error("api call failed: {message}")]
    ApiCall { message: String },

    #[error("internal chain error: {0}")]
    Internal(String),
}

impl ChainError {
    pub fn api_call<S: Into<String>>(message: S) -> Self {
        ChainError::ApiCall {
            message: message.into(),
        }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        ChainError::Internal(message.into())
    }
}

pub type ChainResult<T> = Result<T, ChainError>;

/// Shared environment for the steps of one chain: where units of work run,
/// what one unit is, and the chain's cancellation flag.
pub struct ChainContext {
    pub spawner: Arc<dyn Spawner>,
    pub api: Arc<dyn AsyncApi>,
    pub cancel: CancelToken,
}

impl ChainContext {
    pub fn new(spawner: Arc<dyn Spawner>, api: Arc<dyn AsyncApi>) -> Self {
        Self {
            spawner,
            api,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(
        spawner: Arc<dyn Spawner>,
        api: Arc<dyn AsyncApi>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            spawner,
            api,
            cancel,
        }
    }
}

/// A composable unit of asynchronous work.
///
/// `drive` consumes the step (`Box<Self>`), so a step instance is driven at
/// most once; constructing a chain is cheap and synchronous, driving it is
/// what starts the work. The continuation is resumed exactly once, after any
/// wrapped asynchronous side effect completes (possibly on a different
/// thread than the caller's), unless the chain is cancelled first, in which
/// case it is abandoned.
pub trait Step<A: Send + 'static>: Send {
    fn drive(self: Box<Self>, k: Continuation<A>);
}

pub type BoxStep<A> = Box<dyn Step<A>>;

/// Resolves immediately with a fixed value, on the calling thread.
///
/// Ends a chain, or injects a known value mid-chain. No side effects beyond
/// resuming the continuation.
pub struct Terminal<A> {
    value: A,
}

impl<A: Send + 'static> Terminal<A> {
    pub fn new(value: A) -> Self {
        Self { value }
    }

    pub fn boxed(value: A) -> BoxStep<A> {
        Box::new(Self::new(value))
    }
}

impl<A: Send + 'static> Step<A> for Terminal<A> {
    fn drive(self: Box<Self>, k: Continuation<A>) {
        k.resume(Ok(self.value));
    }
}

type Operation<A> = Box<dyn FnOnce() -> ChainResult<A> + Send>;

/// Starts one unit of external asynchronous work and resumes the
/// continuation from wherever that work completes.
///
/// `drive` submits the unit to the chain's spawner and returns immediately;
/// the caller must not assume same-thread continuation. When the provider
/// unit fails, the operation is skipped and the failure is delivered
/// instead. When the chain's cancel token is already set, no work is issued
/// and the continuation is abandoned, never to be invoked.
pub struct ApiCall<A> {
    context: Arc<ChainContext>,
    operation: Operation<A>,
}

impl<A: Send + 'static> ApiCall<A> {
    pub fn new(
        context: Arc<ChainContext>,
        operation: impl FnOnce() -> ChainResult<A> + Send + 'static,
    ) -> Self {
        Self {
            context,
            operation: Box::new(operation),
        }
    }

    pub fn boxed(
        context: Arc<ChainContext>,
        operation: impl FnOnce() -> ChainResult<A> + Send + 'static,
    ) -> BoxStep<A> {
        Box::new(Self::new(context, operation))
    }
}

impl<A: Send + 'static> Step<A> for ApiCall<A> {
    fn drive(self: Box<Self>, k: Continuation<A>) {
        if self.context.cancel.is_cancelled() {
            debug!("api call skipped: chain cancelled");
            k.abandon();
            return;
        }

        let api = self.context.api.clone();
        let operation = self.operation;
        trace!(api = api.name(), "issuing api call unit");

        self.context.spawner.spawn_unit(
            async move {
                match api.unit().await {
                    Ok(()) => k.resume(operation()),
                    Err(e) => k.resume(Err(e)),
                }
            }
            .boxed(),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::provider::{
        api::MockAsyncApi, spawner::MockSpawner, InlineSpawner, InstantApi,
    };

    // テスト用のセットアップ関数
    fn inline_context() -> Arc<ChainContext> {
        Arc::new(ChainContext::new(
            Arc::new(InlineSpawner),
            Arc::new(InstantApi),
        ))
    }

    fn capture<A: Send + 'static>() -> (
        Arc<Mutex<Option<ChainResult<A>>>>,
        Continuation<A>,
    ) {
        let slot = Arc::new(Mutex::new(None));
        let sink = slot.clone();
        let k = Continuation::new(move |outcome| {
            *sink.lock().unwrap() = Some(outcome);
        });
        (slot, k)
    }

    /// Api whose unit always reports failure.
    struct FailingApi;

    #[async_trait]
    impl AsyncApi for FailingApi {
        async fn unit(&self) -> ChainResult<()> {
            Err(ChainError::api_call("unit failed"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_terminal_resolves_synchronously() {
        let (slot, k) = capture::<i64>();

        Terminal::boxed(42).drive(k);

        assert_eq!(*slot.lock().unwrap(), Some(Ok(42)));
    }

    #[test]
    fn test_api_call_delivers_operation_payload() {
        let (slot, k) = capture::<String>();

        ApiCall::boxed(inline_context(), || Ok("Data from async".to_string())).drive(k);

        assert_eq!(
            *slot.lock().unwrap(),
            Some(Ok("Data from async".to_string()))
        );
    }

    #[test]
    fn test_api_call_unit_failure_skips_operation() {
        let context = Arc::new(ChainContext::new(
            Arc::new(InlineSpawner),
            Arc::new(FailingApi),
        ));
        let (slot, k) = capture::<String>();

        ApiCall::boxed(context, || {
            panic!("operation must not run after a failed unit")
        })
        .drive(k);

        assert_eq!(
            *slot.lock().unwrap(),
            Some(Err(ChainError::api_call("unit failed")))
        );
    }

    #[test]
    fn test_cancelled_api_call_issues_no_work() {
        let mut spawner = MockSpawner::new();
        spawner.expect_spawn_unit().times(0);

        let context = Arc::new(ChainContext::new(
            Arc::new(spawner),
            Arc::new(InstantApi),
        ));
        context.cancel.cancel();

        let (slot, k) = capture::<i64>();
        ApiCall::boxed(context, || Ok(1)).drive(k);

        // 継続は破棄され、一度も呼ばれない
        assert_eq!(*slot.lock().unwrap(), None);
    }

    #[test]
    fn test_mock_api_unit_drives_operation() {
        let mut api = MockAsyncApi::new();
        api.expect_unit().times(1).returning(|| Ok(()));
        api.expect_name().return_const("mock".to_string());

        let context = Arc::new(ChainContext::new(
            Arc::new(InlineSpawner),
            Arc::new(api),
        ));
        let (slot, k) = capture::<i64>();

        ApiCall::boxed(context, || Ok(9)).drive(k);

        assert_eq!(*slot.lock().unwrap(), Some(Ok(9)));
    }
}
