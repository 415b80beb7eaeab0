/// A recipient of stock alerts.
///
/// Users are shared between targets (one user may subscribe to many), so the
/// registry hands them out behind `Arc`. The notification history is not kept
/// here; it lives in a `HistoryStore` owned by the scheduler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub phone_number: String,
    /// 0 means every positive poll notifies.
    pub cooldown_seconds: u64,
}

impl User {
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>, cooldown_seconds: u64) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
            cooldown_seconds,
        }
    }
}
