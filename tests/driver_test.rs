use std::{sync::Arc, time::Duration};

use pretty_assertions::assert_eq;
use renkei::{
    chain::{ChainBuilder, ChainContext},
    driver::{ChainDriver, DriverError},
    provider::{TimerApi, TokioSpawner},
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    // tracing_subscriberの初期化
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn timer_context(delay: Duration) -> Arc<ChainContext> {
    Arc::new(ChainContext::new(
        Arc::new(TokioSpawner::new()),
        Arc::new(TimerApi::new(delay)),
    ))
}

#[tokio::test]
async fn test_concurrent_chains_resolve_independently() {
    let driver = ChainDriver::new(Duration::from_secs(5));

    let first = ChainBuilder::call(timer_context(Duration::from_millis(20)), || Ok(1i64))
        .map(|x| x + 10)
        .build();
    let second = ChainBuilder::call(timer_context(Duration::from_millis(5)), || Ok(2i64))
        .map(|x| x + 20)
        .build();

    let (first_result, second_result) = tokio::join!(driver.run(first), driver.run(second));

    assert_eq!(first_result.unwrap(), 11);
    assert_eq!(second_result.unwrap(), 22);
    assert_eq!(driver.active_count(), 0);
}

#[tokio::test]
async fn test_timeout_cancels_slow_chain() {
    let context = timer_context(Duration::from_millis(500));
    let driver = ChainDriver::new(Duration::from_secs(5));
    let chain = ChainBuilder::call(context, || Ok(1i64)).build();
    let cancel = chain.cancel_token();

    let result = driver.run_with_timeout(chain, Duration::from_millis(50)).await;

    assert!(matches!(result, Err(DriverError::Timeout(_))));
    assert!(cancel.is_cancelled());
}

#[tokio::test]
async fn test_cancel_all_stops_active_chains() {
    let driver = Arc::new(ChainDriver::new(Duration::from_secs(5)));

    let mut handles = Vec::new();
    for _ in 0..2 {
        let context = timer_context(Duration::from_millis(100));
        let chain = ChainBuilder::call(context, || Ok(1i64))
            .then_call(|x| Ok(x + 1))
            .build();
        let driver = driver.clone();
        handles.push(tokio::spawn(async move { driver.run(chain).await }));
    }

    // 両方のチェーンが最初のユニットを飛ばしている間に全キャンセル
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(driver.cancel_all(), 2);

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(DriverError::Cancelled(_))));
    }
    assert_eq!(driver.active_count(), 0);
}
