use chrono::{DateTime, Local, Utc};

use super::PollResult;

/// What a user is told when a target shows stock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StockAlert {
    pub target_name: String,
    pub target_url: String,
    pub match_count: usize,
    pub detected_at: DateTime<Utc>,
}

impl StockAlert {
    pub fn from_result(result: &PollResult, detected_at: DateTime<Utc>) -> Self {
        Self {
            target_name: result.target.name.clone(),
            target_url: result.target.url.clone(),
            match_count: result.match_count,
            detected_at,
        }
    }

    /// SMS body: name and count, local timestamp, then the link.
    pub fn message_body(&self) -> String {
        let stamp = self
            .detected_at
            .with_timezone(&Local)
            .format("%b %e %H:%M:%S");
        format!(
            "{} has {} items in stock\nTime: {}\n{}",
            self.target_name, self.match_count, stamp, self.target_url
        )
    }
}
