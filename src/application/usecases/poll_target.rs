use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::{FetchError, PageFetcher};
use crate::domain::{PollOutcome, PollResult, Target, count_prefixed_buttons};

/// Fetch one target and count its matching buttons.
///
/// Never fails: fetch and scan problems are logged and reported as a
/// zero-match result so the loop keeps going.
pub struct PollTargetUseCase {
    pub fetcher: Arc<dyn PageFetcher>,
}

impl PollTargetUseCase {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn execute(&self, target: Arc<Target>, cancel: &CancellationToken) -> PollResult {
        let fetched = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(target_name = %target.name, "poll cancelled");
                return PollResult::failed(target, PollOutcome::Cancelled);
            }
            fetched = self.fetcher.fetch(&target.url) => fetched,
        };

        let page = match fetched {
            Ok(page) => page,
            Err(FetchError::Timeout) => {
                tracing::warn!(target_name = %target.name, url = %target.url, "timeout fetching page");
                return PollResult::failed(target, PollOutcome::FetchFailed(FetchError::Timeout.to_string()));
            }
            Err(e) => {
                tracing::error!(target_name = %target.name, url = %target.url, "fetch failed: {e}");
                return PollResult::failed(target, PollOutcome::FetchFailed(e.to_string()));
            }
        };

        // partial or error pages may still carry the button, so scan anyway
        if page.status != 200 {
            tracing::warn!(target_name = %target.name, status = page.status, "unexpected HTTP status");
        }

        match count_prefixed_buttons(&page.body, &target.button_text_prefix) {
            Ok(n) => PollResult::scanned(target, page.status, n),
            Err(e) => {
                tracing::error!(target_name = %target.name, "scan failed: {e}");
                PollResult::failed(target, PollOutcome::ScanFailed(e.to_string()))
            }
        }
    }
}
