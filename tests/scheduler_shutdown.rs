mod common;

use std::sync::Arc;
use std::time::Duration;

use stockpulse::application::HistoryStore;
use stockpulse::domain::Registry;
use stockpulse::infrastructure::{
    clock::ManualClock, fake_fetcher::FakePageFetcher, memory_store::InMemoryHistoryStore,
};
use tokio_util::sync::CancellationToken;

use common::{RecordingNotifier, scheduler, target, user};

#[tokio::test]
async fn run_polls_immediately_and_stops_on_cancel() {
    let alice = user("Alice", 3600);
    let registry = Registry::new(
        vec![target("WidgetX", "http://shop.test/x", "Buy Now", &[&alice])],
        vec![alice.clone()],
    );
    let fetcher = FakePageFetcher::new();
    fetcher.set_buttons("http://shop.test/x", "Buy Now", 2);
    let notifier = RecordingNotifier::new();
    let history = InMemoryHistoryStore::new();
    let clock = ManualClock::epoch();
    let scheduler = scheduler(
        registry,
        Arc::new(fetcher),
        Arc::new(notifier.clone()),
        &history,
        &clock,
    );

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(scheduler.run(cancel.clone()));

    // the first tick fires at startup; wait for its dispatch to land
    for _ in 0..100 {
        if history.last_notified("Alice", "WidgetX").await.unwrap().is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(notifier.count(), 1);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("scheduler should stop after cancel")
        .unwrap();
}
