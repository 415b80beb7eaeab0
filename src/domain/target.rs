use std::sync::Arc;

use super::User;

/// A monitored page plus the button text prefix that signals availability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub name: String, // unique key
    pub url: String,
    pub button_text_prefix: String,
    subscribers: Vec<Arc<User>>,
}

impl Target {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        button_text_prefix: impl Into<String>,
        subscribers: Vec<Arc<User>>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            button_text_prefix: button_text_prefix.into(),
            subscribers,
        }
    }

    /// Subscribed users, in configuration order.
    pub fn subscribers(&self) -> &[Arc<User>] {
        &self.subscribers
    }
}
