use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::chain::ChainResult;
use crate::config::ProviderConfig;

/// External asynchronous boundary.
///
/// One call to [`AsyncApi::unit`] is one opaque unit of external work (a
/// timer tick, an I/O completion) that eventually finishes exactly once.
/// Chains never observe how the unit is performed, only that it completed
/// or failed.
#[mockall::automock]
#[async_trait]
pub trait AsyncApi: Send + Sync {
    /// Performs one unit of external asynchronous work.
    async fn unit(&self) -> ChainResult<()>;

    fn name(&self) -> &str;
}

/// Simulates external latency with a Tokio timer.
pub struct TimerApi {
    delay: Duration,
}

impl TimerApi {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(config.unit_delay)
    }
}

#[async_trait]
impl AsyncApi for TimerApi {
    async fn unit(&self) -> ChainResult<()> {
        trace!(delay_ms = self.delay.as_millis() as u64, "timer unit started");
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    fn name(&self) -> &str {
        "timer"
    }
}

/// Completes immediately. The synchronous fake for tests and benches.
pub struct InstantApi;

#[async_trait]
impl AsyncApi for InstantApi {
    async fn unit(&self) -> ChainResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "instant"
    }
}
