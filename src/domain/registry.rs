use std::sync::Arc;

use super::{Target, User};

/// Targets and users, built once at startup and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    targets: Vec<Arc<Target>>,
    users: Vec<Arc<User>>,
}

impl Registry {
    pub fn new(targets: Vec<Target>, users: Vec<Arc<User>>) -> Self {
        Self {
            targets: targets.into_iter().map(Arc::new).collect(),
            users,
        }
    }

    pub fn targets(&self) -> &[Arc<Target>] {
        &self.targets
    }

    pub fn users(&self) -> &[Arc<User>] {
        &self.users
    }

    pub fn target(&self, name: &str) -> Option<&Arc<Target>> {
        self.targets.iter().find(|t| t.name == name)
    }
}
