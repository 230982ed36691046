//! Canonical absolute path handling for rule paths

use std::path::{Path, PathBuf};

/// A lexically cleaned path.
///
/// Duplicate separators are collapsed, `.` components removed and `..`
/// components resolved against the preceding component. An absolute path
/// never climbs above `/`. There is no trailing separator except for the
/// root itself. The filesystem is never consulted, so symlinks are not
/// resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalPath {
    inner: String,
}

impl CanonicalPath {
    /// Clean any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&raw),
        }
    }

    /// The filesystem root, `/`.
    pub fn root() -> Self {
        Self {
            inner: "/".to_string(),
        }
    }

    /// Get the internal string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/')
    }

    pub fn is_root(&self) -> bool {
        self.inner == "/"
    }

    /// Non-empty components, root first.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|c| !c.is_empty())
    }

    /// Join a single component onto this path.
    pub fn join(&self, component: &str) -> Self {
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, component)
        } else {
            format!("{}/{}", self.inner, component)
        };
        Self::new(joined)
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.inner.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Get the last component.
    pub fn file_name(&self) -> Option<&str> {
        self.components().last()
    }

    /// Component-wise prefix test: `/a` is an ancestor of `/a/b`, not of `/ab`.
    pub fn starts_with(&self, ancestor: &CanonicalPath) -> bool {
        let mut mine = self.components();
        ancestor.components().all(|c| mine.next() == Some(c))
            && self.is_absolute() == ancestor.is_absolute()
    }
}

/// Lexical clean with the usual rules for `.`, `..` and repeated separators.
fn clean(raw: &str) -> String {
    if raw.is_empty() {
        return ".".to_string();
    }
    let absolute = raw.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for component in raw.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

impl AsRef<Path> for CanonicalPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for CanonicalPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CanonicalPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for CanonicalPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for CanonicalPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
