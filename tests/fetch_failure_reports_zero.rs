mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, http::StatusCode, response::Html, routing::get};
use stockpulse::application::usecases::PollTargetUseCase;
use stockpulse::application::{FetchError, HistoryStore, PageFetcher};
use stockpulse::domain::{PollOutcome, Registry};
use stockpulse::infrastructure::{
    clock::ManualClock, fake_fetcher::FakePageFetcher, http_fetcher::HttpPageFetcher,
    memory_store::InMemoryHistoryStore,
};
use tokio_util::sync::CancellationToken;

use common::{RecordingNotifier, scheduler, serve, target, user};

fn shop() -> Router {
    Router::new()
        .route(
            "/in-stock",
            get(|| async { Html("<button>Buy Now</button><button>Buy Now</button>") }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Html("<button>Buy Now</button>")
            }),
        )
        .route(
            "/degraded",
            get(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Html("<p>busy</p><button>Buy Now</button>"),
                )
            }),
        )
}

fn fetcher(timeout: Duration) -> HttpPageFetcher {
    HttpPageFetcher::new(timeout, "stockpulse-test").unwrap()
}

#[tokio::test]
async fn http_fetcher_returns_status_and_body() {
    let base = serve(shop()).await;
    let page = fetcher(Duration::from_secs(5))
        .fetch(&format!("{base}/in-stock"))
        .await
        .unwrap();
    assert_eq!(page.status, 200);
    assert!(String::from_utf8_lossy(&page.body).contains("Buy Now"));
}

#[tokio::test]
async fn slow_page_times_out() {
    let base = serve(shop()).await;
    let err = fetcher(Duration::from_millis(200))
        .fetch(&format!("{base}/slow"))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Timeout);
}

#[tokio::test]
async fn refused_connection_is_a_fetch_error() {
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = fetcher(Duration::from_secs(2))
        .fetch(&format!("http://{addr}/"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Connect(_) | FetchError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn timed_out_poll_reports_zero_matches() {
    let base = serve(shop()).await;
    let t = Arc::new(target("WidgetX", &format!("{base}/slow"), "Buy Now", &[]));
    let poll = PollTargetUseCase::new(Arc::new(fetcher(Duration::from_millis(200))));

    let result = poll.execute(t, &CancellationToken::new()).await;
    assert_eq!(result.match_count, 0);
    assert!(matches!(result.outcome, PollOutcome::FetchFailed(_)));
}

#[tokio::test]
async fn non_200_page_is_still_scanned() {
    let base = serve(shop()).await;
    let t = Arc::new(target("WidgetX", &format!("{base}/degraded"), "Buy Now", &[]));
    let poll = PollTargetUseCase::new(Arc::new(fetcher(Duration::from_secs(5))));

    let result = poll.execute(t, &CancellationToken::new()).await;
    assert_eq!(result.match_count, 1);
    assert_eq!(result.outcome, PollOutcome::Scanned { status: 503 });
}

#[tokio::test]
async fn cancelled_poll_returns_promptly() {
    let base = serve(shop()).await;
    let t = Arc::new(target("WidgetX", &format!("{base}/slow"), "Buy Now", &[]));
    let poll = PollTargetUseCase::new(Arc::new(fetcher(Duration::from_secs(30))));
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(3), poll.execute(t, &cancel))
        .await
        .expect("poll should observe cancellation");
    assert_eq!(result.outcome, PollOutcome::Cancelled);
    assert_eq!(result.match_count, 0);
}

#[tokio::test]
async fn failed_fetch_notifies_nobody_and_keeps_history() {
    let alice = user("Alice", 0);
    let registry = Registry::new(
        vec![
            target("WidgetX", "http://shop.test/x", "Buy Now", &[&alice]),
            target("GadgetY", "http://shop.test/y", "Buy Now", &[&alice]),
        ],
        vec![alice.clone()],
    );
    let fetcher = FakePageFetcher::new();
    fetcher.set_error("http://shop.test/x", FetchError::Timeout);
    fetcher.set_buttons("http://shop.test/y", "Buy Now", 1);

    let notifier = RecordingNotifier::new();
    let history = InMemoryHistoryStore::new();
    let clock = ManualClock::epoch();
    let mut scheduler = scheduler(
        registry,
        Arc::new(fetcher),
        Arc::new(notifier.clone()),
        &history,
        &clock,
    );

    scheduler.run_once(&CancellationToken::new()).await;

    assert_eq!(
        notifier.sent(),
        vec![("Alice".to_string(), "GadgetY".to_string(), 1)]
    );
    assert_eq!(history.last_notified("Alice", "WidgetX").await.unwrap(), None);
}
