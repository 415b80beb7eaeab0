use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::application::usecases::{DispatchOutcome, DispatchUseCase, PollTargetUseCase};
use crate::application::{Clock, HistoryStore};
use crate::domain::{CooldownPolicy, PollResult, Registry};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Debug)]
pub struct SchedulerSettings {
    /// Tick interval.
    pub looptime: Duration,
}

/// The poll-scrape-notify loop.
///
/// Polls and dispatches run as independent tasks and report back over
/// channels. The scheduler is the only writer of notification history, and
/// it keeps at most one dispatch in flight per (user, target).
pub struct Scheduler {
    registry: Arc<Registry>,
    poll: Arc<PollTargetUseCase>,
    dispatch: Arc<DispatchUseCase>,
    history: Arc<dyn HistoryStore>,
    clock: Arc<dyn Clock>,
    settings: SchedulerSettings,
    in_flight: HashSet<(String, String)>,
    tracker: TaskTracker,
}

impl Scheduler {
    pub fn new(
        registry: Arc<Registry>,
        poll: PollTargetUseCase,
        dispatch: DispatchUseCase,
        history: Arc<dyn HistoryStore>,
        clock: Arc<dyn Clock>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            registry,
            poll: Arc::new(poll),
            dispatch: Arc::new(dispatch),
            history,
            clock,
            settings,
            in_flight: HashSet::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Run until `cancel` fires, then wait for in-flight tasks to wind down.
    pub async fn run(mut self, cancel: CancellationToken) {
        let (result_tx, mut result_rx) = mpsc::channel::<PollResult>(CHANNEL_CAPACITY);
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<DispatchOutcome>(CHANNEL_CAPACITY);

        let mut ticker = tokio::time::interval(self.settings.looptime);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            targets = self.registry.targets().len(),
            users = self.registry.users().len(),
            looptime_secs = self.settings.looptime.as_secs(),
            "polling started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.launch_polls(&result_tx, &cancel),
                Some(result) = result_rx.recv() => {
                    self.handle_result(result, &outcome_tx, &cancel).await;
                }
                Some(outcome) = outcome_rx.recv() => self.handle_outcome(outcome).await,
            }
        }

        tracing::info!(in_flight = self.tracker.len(), "shutting down");
        // closed receivers make pending sends return instead of blocking
        drop(result_rx);
        drop(outcome_rx);
        self.tracker.close();
        self.tracker.wait().await;
        tracing::info!("scheduler stopped");
    }

    /// One complete tick: poll every target, dispatch, and wait for every
    /// dispatch outcome to be recorded.
    pub async fn run_once(&mut self, cancel: &CancellationToken) {
        let (result_tx, mut result_rx) = mpsc::channel::<PollResult>(CHANNEL_CAPACITY);
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<DispatchOutcome>(CHANNEL_CAPACITY);

        self.launch_polls(&result_tx, cancel);
        drop(result_tx);
        while let Some(result) = result_rx.recv().await {
            self.handle_result(result, &outcome_tx, cancel).await;
        }

        drop(outcome_tx);
        while let Some(outcome) = outcome_rx.recv().await {
            self.handle_outcome(outcome).await;
        }
    }

    fn launch_polls(&self, tx: &mpsc::Sender<PollResult>, cancel: &CancellationToken) {
        tracing::debug!(targets = self.registry.targets().len(), "tick");
        for target in self.registry.targets() {
            let target = Arc::clone(target);
            let poll = Arc::clone(&self.poll);
            let tx = tx.clone();
            let cancel = cancel.clone();
            self.tracker.spawn(async move {
                let result = poll.execute(target, &cancel).await;
                let _ = tx.send(result).await;
            });
        }
    }

    async fn handle_result(
        &mut self,
        result: PollResult,
        tx: &mpsc::Sender<DispatchOutcome>,
        cancel: &CancellationToken,
    ) {
        tracing::info!(
            target_name = %result.target.name,
            match_count = result.match_count,
            outcome = %result.outcome,
            "{} had [{}] stock",
            result.target.name,
            result.match_count
        );
        if !result.in_stock() {
            return;
        }

        let now = self.clock.now();
        let result = Arc::new(result);

        for user in result.target.subscribers() {
            let key = (user.name.clone(), result.target.name.clone());
            if self.in_flight.contains(&key) {
                tracing::debug!(user = %user.name, target_name = %result.target.name, "dispatch already in flight");
                continue;
            }

            let last = match self.history.last_notified(&user.name, &result.target.name).await {
                Ok(last) => last,
                Err(e) => {
                    tracing::error!(user = %user.name, "history lookup failed: {e}");
                    continue;
                }
            };
            if !CooldownPolicy::new(user.cooldown_seconds).is_eligible(last, now) {
                tracing::debug!(user = %user.name, target_name = %result.target.name, "in cooldown");
                continue;
            }

            self.in_flight.insert(key);

            if self.dispatch.desktop_enabled() {
                let result = Arc::clone(&result);
                let dispatch = Arc::clone(&self.dispatch);
                let cancel = cancel.clone();
                self.tracker.spawn(async move {
                    dispatch.alert_desktop(&result, &cancel).await;
                });
            }

            let user = Arc::clone(user);
            let result = Arc::clone(&result);
            let dispatch = Arc::clone(&self.dispatch);
            let tx = tx.clone();
            let cancel = cancel.clone();
            self.tracker.spawn(async move {
                let outcome = dispatch.execute(&user, &result, &cancel).await;
                let _ = tx.send(outcome).await;
            });
        }
    }

    async fn handle_outcome(&mut self, outcome: DispatchOutcome) {
        self.in_flight.remove(&outcome.key());
        let Some(sent_at) = outcome.sent_at else {
            return;
        };
        if let Err(e) = self
            .history
            .record_notified(&outcome.user, &outcome.target, sent_at)
            .await
        {
            tracing::error!(user = %outcome.user, target_name = %outcome.target, "failed to record history: {e}");
        }
    }
}
