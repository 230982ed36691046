//! Name-to-id resolution for users and groups

use std::collections::HashMap;

use nix::unistd::{Group, User};

/// Resolves account names to numeric ids.
pub trait IdResolver {
    fn user_id(&self, name: &str) -> Option<u32>;
    fn group_id(&self, name: &str) -> Option<u32>;
}

/// Looks names up in the system password and group databases
/// (`getpwnam_r` / `getgrnam_r`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIds;

impl IdResolver for SystemIds {
    fn user_id(&self, name: &str) -> Option<u32> {
        match User::from_name(name) {
            Ok(user) => user.map(|u| u.uid.as_raw()),
            Err(errno) => {
                tracing::debug!(user = name, %errno, "User lookup failed");
                None
            }
        }
    }

    fn group_id(&self, name: &str) -> Option<u32> {
        match Group::from_name(name) {
            Ok(group) => group.map(|g| g.gid.as_raw()),
            Err(errno) => {
                tracing::debug!(group = name, %errno, "Group lookup failed");
                None
            }
        }
    }
}

/// A fixed table of accounts, independent of the host databases.
#[derive(Debug, Clone, Default)]
pub struct StaticIds {
    users: HashMap<String, u32>,
    groups: HashMap<String, u32>,
}

impl StaticIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, name: impl Into<String>, uid: u32) -> Self {
        self.users.insert(name.into(), uid);
        self
    }

    pub fn with_group(mut self, name: impl Into<String>, gid: u32) -> Self {
        self.groups.insert(name.into(), gid);
        self
    }
}

impl IdResolver for StaticIds {
    fn user_id(&self, name: &str) -> Option<u32> {
        self.users.get(name).copied()
    }

    fn group_id(&self, name: &str) -> Option<u32> {
        self.groups.get(name).copied()
    }
}
