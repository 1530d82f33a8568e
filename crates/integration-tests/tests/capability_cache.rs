// Capability answers are fixed for the process lifetime

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use stepexec_core::application::{CapabilityCache, CapabilityFlag};
use stepexec_core::port::runtime_probe::mocks::ToggleProbe;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_queries_converge() {
    let cache = Arc::new(CapabilityCache::new(
        ToggleProbe::new(true).with_delay(Duration::from_millis(50)),
    ));

    let queries = (0..32).map(|_| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.get().await })
    });
    let answers: Vec<bool> = join_all(queries)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert!(answers.iter().all(|a| *a));
    assert_eq!(cache.probe().calls(), 1);
    assert_eq!(cache.flag(), CapabilityFlag::Supported);
}

#[tokio::test]
async fn test_answer_stable_after_environment_change() {
    let cache = CapabilityCache::new(ToggleProbe::new(false));
    let first = cache.get().await;

    for flip in [true, false, true] {
        cache.probe().set_answer(flip);
        assert_eq!(cache.get().await, first);
    }
    assert_eq!(cache.peek(), Some(&false));
    assert_eq!(cache.probe().calls(), 1);
}
