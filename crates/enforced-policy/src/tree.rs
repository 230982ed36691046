//! The path-indexed policy tree

use std::collections::BTreeMap;
use std::fmt;

use enforced_fs::CanonicalPath;

use crate::{Attrs, FolderSpec, IdResolver, Result, Rule};

/// One node of the policy tree.
///
/// Nodes created only to reach a deeper rule are placeholders: they carry no
/// attributes and contribute nothing when merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyNode {
    path: CanonicalPath,
    attrs: Attrs,
    children: BTreeMap<String, PolicyNode>,
}

impl PolicyNode {
    fn placeholder(path: CanonicalPath) -> Self {
        Self {
            path,
            attrs: Attrs::default(),
            children: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &CanonicalPath {
        &self.path
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn child(&self, name: &str) -> Option<&PolicyNode> {
        self.children.get(name)
    }

    /// Children in component-name order.
    pub fn children(&self) -> impl Iterator<Item = &PolicyNode> {
        self.children.values()
    }

    pub fn carries_policy(&self) -> bool {
        self.attrs.carries_policy()
    }

    fn count(&self) -> usize {
        1 + self.children.values().map(PolicyNode::count).sum::<usize>()
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let name = if depth == 0 {
            self.path.as_str()
        } else {
            self.path.file_name().unwrap_or_default()
        };
        write!(f, "{:indent$}{name}", "", indent = depth * 2)?;
        if self.carries_policy() {
            write!(f, " [{}]", self.attrs)?;
        }
        writeln!(f)?;
        for child in self.children.values() {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

/// A trie of rules keyed by path component, rooted at `/`.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTree {
    root: PolicyNode,
}

impl Default for PolicyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyTree {
    /// A tree holding only the attribute-less root.
    pub fn new() -> Self {
        Self {
            root: PolicyNode::placeholder(CanonicalPath::root()),
        }
    }

    /// Insert rules in order. A later rule for an already present path
    /// replaces that node's attributes; the node keeps its children.
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut tree = Self::new();
        for rule in rules {
            tree.insert(rule);
        }
        tree
    }

    fn insert(&mut self, rule: Rule) {
        let mut node = &mut self.root;
        for component in rule.path.components() {
            let child_path = node.path.join(component);
            node = node
                .children
                .entry(component.to_string())
                .or_insert_with(|| PolicyNode::placeholder(child_path));
        }
        if node.carries_policy() {
            tracing::debug!(path = %rule.path, "Replacing attributes of an earlier rule");
        }
        node.attrs = rule.attrs;
    }

    pub fn root(&self) -> &PolicyNode {
        &self.root
    }

    /// The node at exactly `path`, if the tree has one.
    pub fn get(&self, path: &CanonicalPath) -> Option<&PolicyNode> {
        path.components()
            .try_fold(&self.root, |node, component| node.child(component))
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// True when no node carries policy.
    pub fn is_empty(&self) -> bool {
        fn any_policy(node: &PolicyNode) -> bool {
            node.carries_policy() || node.children().any(any_policy)
        }
        !any_policy(&self.root)
    }
}

impl fmt::Display for PolicyTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.write_indented(f, 0)
    }
}

/// Validates configuration entries and assembles them into a [`PolicyTree`].
pub struct TreeBuilder<'a> {
    ids: &'a dyn IdResolver,
    tolerant: bool,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(ids: &'a dyn IdResolver) -> Self {
        Self {
            ids,
            tolerant: false,
        }
    }

    /// Accept user and group names the resolver does not know, with id 0.
    pub fn tolerant(mut self, tolerant: bool) -> Self {
        self.tolerant = tolerant;
        self
    }

    /// Compile every entry, failing on the first invalid one.
    pub fn build(&self, specs: &[FolderSpec]) -> Result<PolicyTree> {
        let rules = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| Rule::compile(spec, index, self.ids, self.tolerant))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(rules = rules.len(), "Compiled configuration rules");
        Ok(PolicyTree::from_rules(rules))
    }
}
