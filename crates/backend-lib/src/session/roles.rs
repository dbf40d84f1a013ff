//! Role lookup for session principals.
use std::collections::{BTreeSet, HashMap};

use dashmap::DashMap;

/// Resolves the role names granted to a user
pub trait RoleDirectory: Send + Sync {
    /// Roles for `user`, sorted; empty when the user is unknown
    fn roles_for_user(&self, user: &str) -> Vec<String>;
}

/// Role directory kept in memory, safe to update while being read
#[derive(Debug, Default)]
pub struct InMemoryRoleDirectory {
    roles: DashMap<String, BTreeSet<String>>,
}

impl InMemoryRoleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a `user -> roles` table, e.g. the `sessions.roles` config section
    pub fn from_map(table: &HashMap<String, Vec<String>>) -> Self {
        let directory = Self::new();
        for (user, roles) in table {
            directory.assign(user, roles.iter().cloned());
        }
        directory
    }

    /// Replace the roles granted to `user`
    pub fn assign<I, R>(&self, user: &str, roles: I)
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let roles: BTreeSet<String> = roles
            .into_iter()
            .map(Into::into)
            .filter(|role| !role.trim().is_empty())
            .collect();
        self.roles.insert(user.to_string(), roles);
    }

    /// Drop every role granted to `user`
    pub fn revoke(&self, user: &str) -> bool {
        self.roles.remove(user).is_some()
    }
}

impl RoleDirectory for InMemoryRoleDirectory {
    fn roles_for_user(&self, user: &str) -> Vec<String> {
        self.roles
            .get(user)
            .map(|roles| roles.iter().cloned().collect())
            .unwrap_or_default()
    }
}
