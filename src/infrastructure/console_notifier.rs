use async_trait::async_trait;

use crate::application::{AppResult, DispatchReceipt, Notifier};
use crate::domain::{StockAlert, User};

/// Prints alerts instead of sending them. Used by `--dry-run`.
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, user: &User, alert: &StockAlert) -> AppResult<DispatchReceipt> {
        println!(
            "NOTIFY: to={} ({}) target={} matches={} url={}",
            user.name, user.phone_number, alert.target_name, alert.match_count, alert.target_url
        );
        Ok(DispatchReceipt::default())
    }
}
