//! Base folder discovery
//!
//! The base folders are the shallowest policy-carrying nodes: every subtree
//! the daemon enforces hangs below exactly one of them, so they are what gets
//! walked and watched at startup.

use enforced_fs::CanonicalPath;

use crate::{Error, PolicyNode, PolicyTree, Result};

impl PolicyTree {
    /// Paths of policy-carrying nodes with no policy-carrying ancestor, in
    /// pre-order.
    pub fn base_folders(&self) -> Vec<CanonicalPath> {
        let mut folders = Vec::new();
        collect(self.root(), &mut folders);
        folders
    }

    /// Like [`base_folders`](Self::base_folders) but an empty result is a
    /// configuration error.
    pub fn require_base_folders(&self) -> Result<Vec<CanonicalPath>> {
        let folders = self.base_folders();
        if folders.is_empty() {
            return Err(Error::NoRules);
        }
        Ok(folders)
    }
}

fn collect(node: &PolicyNode, out: &mut Vec<CanonicalPath>) {
    if node.carries_policy() {
        out.push(node.path().clone());
        return;
    }
    for child in node.children() {
        collect(child, out);
    }
}
