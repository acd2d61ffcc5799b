use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tracing::trace;

/// A scheduled unit of chain work, boxed for submission.
pub type UnitFuture = BoxFuture<'static, ()>;

/// Task submission boundary for chain work.
///
/// An api call step never runs its unit inline; it hands the unit to a
/// spawner and returns. Which execution context the unit lands on is the
/// spawner's decision alone.
#[mockall::automock]
pub trait Spawner: Send + Sync {
    /// Schedules one unit of work. Returns once the unit has been handed
    /// off; the unit itself runs later, possibly on another thread.
    fn spawn_unit(&self, unit: UnitFuture);
}

/// Spawns units onto a Tokio runtime captured at construction time.
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    /// Captures the current runtime handle.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime; use
    /// [`TokioSpawner::with_handle`] in that case.
    pub fn new() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Default for TokioSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spawner for TokioSpawner {
    fn spawn_unit(&self, unit: UnitFuture) {
        trace!("spawning unit onto tokio runtime");
        self.handle.spawn(unit);
    }
}

/// Runs units to completion on the calling thread before returning.
///
/// The deterministic fake for tests and benches. Pair it with an api that
/// completes without a timer ([`InstantApi`](super::InstantApi)); a unit
/// waiting on a Tokio timer would block the caller here.
pub struct InlineSpawner;

impl Spawner for InlineSpawner {
    fn spawn_unit(&self, unit: UnitFuture) {
        futures::executor::block_on(unit);
    }
}
