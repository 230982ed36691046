//! Effective policy resolution

use std::borrow::Cow;
use std::path::{Component, Path};

use enforced_fs::CanonicalPath;

use crate::{Attrs, PolicyNode, PolicyTree};

/// The merged result of every node from the root down to the deepest node
/// matching a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePolicy {
    /// The deepest tree node that took part in the merge
    pub path: CanonicalPath,
    pub attrs: Attrs,
}

impl Default for EffectivePolicy {
    fn default() -> Self {
        Self {
            path: CanonicalPath::root(),
            attrs: Attrs::default(),
        }
    }
}

impl EffectivePolicy {
    /// Fold one node into the accumulator.
    ///
    /// A set user or group overrides; a mode overrides only when non-zero.
    pub fn merge(&mut self, node: &PolicyNode) {
        let attrs = node.attrs();
        self.path = node.path().clone();

        if let Some(user) = attrs.user.as_ref().filter(|u| !u.name.is_empty()) {
            self.attrs.user = Some(user.clone());
        }
        if let Some(group) = attrs.group.as_ref().filter(|g| !g.name.is_empty()) {
            self.attrs.group = Some(group.clone());
        }
        if let Some(mode) = attrs.file_mode.filter(|m| !m.is_zero()) {
            self.attrs.file_mode = Some(mode);
        }
        if let Some(mode) = attrs.dir_mode.filter(|m| !m.is_zero()) {
            self.attrs.dir_mode = Some(mode);
        }
    }

    /// Nothing to enforce.
    pub fn is_empty(&self) -> bool {
        !self.attrs.carries_policy()
    }
}

impl PolicyTree {
    /// Effective policy for an absolute filesystem path.
    pub fn resolve(&self, path: &Path) -> EffectivePolicy {
        let components: Vec<Cow<'_, str>> = path
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy()),
                _ => None,
            })
            .collect();
        self.resolve_components(components.iter().map(|c| &**c))
    }

    /// Descend one component at a time, merging each node on the way.
    ///
    /// Descent stops at the first component with no matching child, so
    /// nothing below an unmatched component is consulted. Empty components
    /// are ignored.
    pub fn resolve_components<'a>(
        &self,
        components: impl IntoIterator<Item = &'a str>,
    ) -> EffectivePolicy {
        let mut policy = EffectivePolicy::default();
        let mut node = self.root();
        policy.merge(node);

        for component in components.into_iter().filter(|c| !c.is_empty()) {
            match node.child(component) {
                Some(child) => {
                    node = child;
                    policy.merge(node);
                }
                None => break,
            }
        }
        policy
    }
}
