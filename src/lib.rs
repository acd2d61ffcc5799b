//! # RENKEI: Continuation-Chain Execution Library
//!
//! RENKEI composes asynchronous, callback-driven steps into chains without
//! blocking, and terminates such chains deterministically.
//!
//! ## Core Mechanism
//!
//! A step delivers its result by resuming a continuation instead of
//! returning it ([`continuation`], [`chain::step`]). The bind combinator
//! ([`chain::combinator`]) composes a step with a function producing the
//! next step, so a whole workflow becomes one drivable value:
//!
//! ```text
//! driver ──drive(k)──▶ Bound ──▶ ApiCall ─ ─ resume ─ ▶ Bound ──▶ Terminal ─ ─▶ k
//! ```
//!
//! ### 1. Steps and Combinators
//! - Base steps ([`chain::step`]): `Terminal` resolves synchronously,
//!   `ApiCall` offloads one unit of external work
//! - Composition ([`chain::combinator`]): `Bound`, `bind`, and the fluent
//!   `ChainBuilder`
//! - Bounded repetition ([`chain::loop_step`]): a state machine performing
//!   exactly `n` async units, then resolving with a terminal marker
//!
//! ### 2. Swappable Async Boundary
//! Where and how a unit of work runs is a construction-time decision
//! ([`provider`]): a Tokio runtime with timer latency in production, an
//! inline executor completing instantly in tests.
//!
//! ### 3. Driving and Supervision
//! The driver ([`driver`]) supplies the final continuation, awaits the
//! outcome over a oneshot channel, applies a timeout, and tracks in-flight
//! chains for cancellation ([`cancellation`]) and status queries.
//!
//! ## Exactly-Once Delivery
//!
//! A continuation is invoked exactly once per step activation. The handle
//! is move-only and `drive` consumes its step, so double invocation and
//! double driving do not compile; cancellation abandons the continuation
//! explicitly instead of invoking it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use renkei::chain::{ChainBuilder, ChainContext};
//! use renkei::driver::ChainDriver;
//! use renkei::provider::{TimerApi, TokioSpawner};
//!
//! # async fn example() -> Result<(), renkei::RenkeiError> {
//! let context = Arc::new(ChainContext::new(
//!     Arc::new(TokioSpawner::new()),
//!     Arc::new(TimerApi::new(Duration::from_millis(100))),
//! ));
//!
//! let chain = ChainBuilder::call(context, || Ok(5i64))
//!     .map(|x| x * 2)
//!     .build();
//!
//! let driver = ChainDriver::new(Duration::from_secs(5));
//! let result = driver.run(chain).await?;
//! assert_eq!(result, 10);
//! # Ok(())
//! # }
//! ```

pub mod cancellation;
pub mod chain;
pub mod config;
pub mod continuation;
pub mod driver;
pub mod error;
pub mod provider;

// Re-exports
pub use cancellation::CancelToken;
pub use chain::*;
pub use continuation::Continuation;
pub use driver::*;
pub use error::*;

pub use error::Error as RenkeiError;

#[cfg(test)]
mod tests {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    #[ctor::ctor]
    fn init_tests() {
        // テストの前に一度だけ実行したい処理
        // tracing_subscriberの初期化
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }
}
