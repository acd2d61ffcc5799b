//! # Chain Driver
//!
//! The driver is the top-level caller of a chain: it supplies the final
//! continuation, starts the chain, and awaits the outcome on behalf of async
//! callers. It bridges the continuation world and the async/await world with
//! a oneshot channel. The final continuation sends into the channel, and the
//! driver awaits the receiver.
//!
//! ## Key Features
//!
//! - **Result Awaiting**: `run` resolves when the chain's final continuation
//!   fires, with an explicit timeout on top of the raw drive
//! - **Correlation**: in-flight chains are tracked by id for status queries
//! - **Cancellation**: `cancel` / `cancel_all` flip a chain's token; the
//!   next api call boundary stops issuing work
//!
//! A timed-out chain has its token cancelled so no further units are
//! issued; a unit already in flight completes into a closed channel and is
//! discarded.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, instrument};

use crate::{
    cancellation::CancelToken,
    chain::{Chain, ChainError, ChainId, ChainResult},
    config::DriverConfig,
    continuation::Continuation,
};

/// A chain currently in flight.
struct ActiveChain {
    cancel: CancelToken,
    started_at: DateTime<Utc>,
}

/// Point-in-time view of one in-flight chain.
#[derive(Debug, Clone, Serialize)]
pub struct ChainStatus {
    pub chain_id: ChainId,
    pub started_at: DateTime<Utc>,
    pub cancelled: bool,
}

pub struct ChainDriver {
    /// Map of in-flight chains indexed by chain ID
    active_chains: Arc<DashMap<ChainId, ActiveChain>>,
    /// Timeout applied by `run` when none is given explicitly
    default_timeout: Duration,
}

impl ChainDriver {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            active_chains: Arc::new(DashMap::new()),
            default_timeout,
        }
    }

    pub fn from_config(config: &DriverConfig) -> Self {
        Self::new(config.chain_timeout)
    }

    /// Drives `chain` and awaits its final value.
    ///
    /// The chain's final continuation is invoked exactly once on completion;
    /// this method resolves with that outcome, or with
    /// [`DriverError::Timeout`] once the driver timeout elapses (the chain's
    /// token is cancelled so no further units are issued), or with
    /// [`DriverError::Cancelled`] when the chain was cancelled before its
    /// next unit was issued.
    #[instrument(skip(self, chain), fields(chain_id = %chain.id()))]
    pub async fn run<A: Send + 'static>(&self, chain: Chain<A>) -> DriverResult<A> {
        self.run_with_timeout(chain, self.default_timeout).await
    }

    #[instrument(skip(self, chain), fields(chain_id = %chain.id()))]
    pub async fn run_with_timeout<A: Send + 'static>(
        &self,
        chain: Chain<A>,
        timeout: Duration,
    ) -> DriverResult<A> {
        let chain_id: ChainId = chain.id().to_string();
        let cancel = chain.cancel_token();
        let (tx, rx) = oneshot::channel::<ChainResult<A>>();

        self.active_chains.insert(
            chain_id.clone(),
            ActiveChain {
                cancel: cancel.clone(),
                started_at: Utc::now(),
            },
        );

        chain.drive(Continuation::new(move |outcome| {
            // 受信側が先に消えた場合は無視する
            let _ = tx.send(outcome);
        }));

        let result = self.await_outcome(&chain_id, timeout, rx, &cancel).await;
        self.active_chains.remove(&chain_id);
        result
    }

    async fn await_outcome<A: Send + 'static>(
        &self,
        chain_id: &str,
        timeout: Duration,
        rx: oneshot::Receiver<ChainResult<A>>,
        cancel: &CancelToken,
    ) -> DriverResult<A> {
        // タイムアウト用のスリープを作成
        let sleep = tokio::time::sleep(timeout);
        tokio::pin!(sleep);

        tokio::select! {
            _ = &mut sleep => {
                debug!(chain_id, "chain timed out, cancelling token");
                cancel.cancel();
                Err(DriverError::Timeout(chain_id.to_string()))
            }
            outcome = rx => match outcome {
                Ok(result) => result.map_err(DriverError::from),
                // 継続が破棄された場合、トークンの状態で区別する
                Err(_) if cancel.is_cancelled() => {
                    Err(DriverError::Cancelled(chain_id.to_string()))
                }
                Err(_) => Err(DriverError::ChannelClosed),
            }
        }
    }

    /// Cancels one in-flight chain. Work already issued completes; no
    /// further units are started.
    #[instrument(skip(self))]
    pub fn cancel(&self, chain_id: &str) -> DriverResult<()> {
        match self.active_chains.get(chain_id) {
            Some(entry) => {
                entry.cancel.cancel();
                Ok(())
            }
            None => Err(DriverError::NotFound(chain_id.to_string())),
        }
    }

    /// Cancels every in-flight chain, returning how many were flagged.
    pub fn cancel_all(&self) -> usize {
        let mut cancelled = 0;
        for entry in self.active_chains.iter() {
            entry.cancel.cancel();
            cancelled += 1;
        }
        debug!(cancelled, "cancelled all active chains");
        cancelled
    }

    pub fn status(&self, chain_id: &str) -> Option<ChainStatus> {
        self.active_chains.get(chain_id).map(|entry| ChainStatus {
            chain_id: chain_id.to_string(),
            started_at: entry.started_at,
            cancelled: entry.cancel.is_cancelled(),
        })
    }

    pub fn active_count(&self) -> usize {
        self.active_chains.len()
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Chain timed out: {0}")]
    Timeout(ChainId),
    #[error("Chain cancelled: {0}")]
    Cancelled(ChainId),
    #[error("Result channel closed")]
    ChannelClosed,
    #[error("Chain not found: {0}")]
    NotFound(ChainId),
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

pub type DriverResult<T> = Result<T, DriverError>;
