#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use stockpulse::application::usecases::{DispatchUseCase, PollTargetUseCase};
use stockpulse::application::{
    AppError, AppResult, DesktopNotifier, DispatchReceipt, Notifier, PageFetcher, Scheduler,
    SchedulerSettings,
};
use stockpulse::domain::{Registry, StockAlert, Target, User};
use stockpulse::infrastructure::{clock::ManualClock, memory_store::InMemoryHistoryStore};

/// Records every (user, target, match_count) it is asked to send.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String, usize)>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails like a gateway 500.
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn sent(&self) -> Vec<(String, String, usize)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user: &User, alert: &StockAlert) -> AppResult<DispatchReceipt> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::GatewayStatus(500));
        }
        self.sent.lock().unwrap().push((
            user.name.clone(),
            alert.target_name.clone(),
            alert.match_count,
        ));
        Ok(DispatchReceipt {
            message_id: Some("SM-test".into()),
        })
    }
}

pub fn user(name: &str, cooldown_seconds: u64) -> Arc<User> {
    Arc::new(User::new(name, format!("+1555{}", name.len()), cooldown_seconds))
}

pub fn target(name: &str, url: &str, prefix: &str, subscribers: &[&Arc<User>]) -> Target {
    Target::new(
        name,
        url,
        prefix,
        subscribers.iter().map(|u| Arc::clone(*u)).collect(),
    )
}

pub fn scheduler(
    registry: Registry,
    fetcher: Arc<dyn PageFetcher>,
    notifier: Arc<dyn Notifier>,
    history: &InMemoryHistoryStore,
    clock: &ManualClock,
) -> Scheduler {
    scheduler_with_desktop(registry, fetcher, notifier, None, history, clock)
}

pub fn scheduler_with_desktop(
    registry: Registry,
    fetcher: Arc<dyn PageFetcher>,
    notifier: Arc<dyn Notifier>,
    desktop: Option<Arc<dyn DesktopNotifier>>,
    history: &InMemoryHistoryStore,
    clock: &ManualClock,
) -> Scheduler {
    let clock = Arc::new(clock.clone());
    Scheduler::new(
        Arc::new(registry),
        PollTargetUseCase::new(fetcher),
        DispatchUseCase {
            notifier,
            desktop,
            clock: clock.clone(),
        },
        Arc::new(history.clone()),
        clock,
        SchedulerSettings {
            looptime: Duration::from_secs(60),
        },
    )
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
