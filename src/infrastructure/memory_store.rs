use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::{AppError, AppResult, HistoryStore};

/// Process-lifetime notification history, partitioned per user.
#[derive(Clone, Default)]
pub struct InMemoryHistoryStore {
    inner: Arc<Mutex<HashMap<String, HashMap<String, DateTime<Utc>>>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn last_notified(&self, user: &str, target: &str) -> AppResult<Option<DateTime<Utc>>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        Ok(inner.get(user).and_then(|h| h.get(target)).copied())
    }

    async fn record_notified(&self, user: &str, target: &str, at: DateTime<Utc>) -> AppResult<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        let entry = inner
            .entry(user.to_string())
            .or_default()
            .entry(target.to_string())
            .or_insert(at);
        if at > *entry {
            *entry = at;
        }
        Ok(())
    }
}
