use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::application::{Clock, DesktopNotifier, Notifier};
use crate::domain::{PollResult, StockAlert, User};

/// What a dispatch unit reports back to the scheduler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub user: String,
    pub target: String,
    /// Set only when the gateway accepted the message.
    pub sent_at: Option<DateTime<Utc>>,
}

impl DispatchOutcome {
    pub fn key(&self) -> (String, String) {
        (self.user.clone(), self.target.clone())
    }
}

pub struct DispatchUseCase {
    pub notifier: Arc<dyn Notifier>,
    pub desktop: Option<Arc<dyn DesktopNotifier>>,
    pub clock: Arc<dyn Clock>,
}

impl DispatchUseCase {
    /// Send one alert to one user. History is not touched here; the caller
    /// records `sent_at` when it is present.
    pub async fn execute(
        &self,
        user: &User,
        result: &PollResult,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        let now = self.clock.now();
        let alert = StockAlert::from_result(result, now);

        let sent_at = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(user = %user.name, target_name = %alert.target_name, "dispatch cancelled");
                None
            }
            sent = self.notifier.notify(user, &alert) => match sent {
                Ok(receipt) => {
                    tracing::info!(
                        user = %user.name,
                        target_name = %alert.target_name,
                        message_id = receipt.message_id.as_deref().unwrap_or("-"),
                        "notification dispatched"
                    );
                    Some(now)
                }
                Err(e) => {
                    tracing::warn!(user = %user.name, target_name = %alert.target_name, "dispatch failed: {e}");
                    None
                }
            },
        };

        DispatchOutcome {
            user: user.name.clone(),
            target: alert.target_name,
            sent_at,
        }
    }

    pub fn desktop_enabled(&self) -> bool {
        self.desktop.is_some()
    }

    /// Best-effort local alert, run as its own task so it can never hold
    /// back an SMS outcome. Failures are only logged.
    pub async fn alert_desktop(&self, result: &PollResult, cancel: &CancellationToken) {
        let Some(desktop) = &self.desktop else {
            return;
        };
        let alert = StockAlert::from_result(result, self.clock.now());
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(target_name = %alert.target_name, "desktop alert cancelled");
            }
            res = desktop.alert(&alert) => {
                if let Err(e) = res {
                    tracing::error!(target_name = %alert.target_name, "desktop alert failed: {e}");
                }
            }
        }
    }
}
