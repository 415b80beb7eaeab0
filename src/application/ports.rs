use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{StockAlert, User};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("notifier error: {0}")]
    Notifier(String),
    #[error("gateway rejected message: HTTP {0}")]
    GatewayStatus(u16),
    #[error("desktop alert error: {0}")]
    Desktop(String),
    #[error("invalid config: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Why a page could not be fetched. Every variant means "zero matches".
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Raw page as returned by the server, whatever the status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Outcome of a successful gateway call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReceipt {
    pub message_id: Option<String>,
}

/// One GET per call, bounded by the fetcher's own timeout.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Deliver an alert to a user (SMS gateway, console, ...).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user: &User, alert: &StockAlert) -> AppResult<DispatchReceipt>;
}

/// Best-effort local alert. Failures never affect SMS dispatch or history.
#[async_trait]
pub trait DesktopNotifier: Send + Sync {
    async fn alert(&self, alert: &StockAlert) -> AppResult<()>;
}

/// Last successful notification per (user, target).
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn last_notified(&self, user: &str, target: &str) -> AppResult<Option<DateTime<Utc>>>;

    /// Never moves an entry backwards in time.
    async fn record_notified(&self, user: &str, target: &str, at: DateTime<Utc>) -> AppResult<()>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
