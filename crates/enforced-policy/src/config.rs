//! Configuration document for the daemon
//!
//! # Example YAML
//!
//! ```yaml
//! folders:
//!   - path: /var
//!     user: www-data
//!     dir_perms: "775"
//!   - path: /var/site
//!     group: www-editors
//!   - path: /lib/folder2
//!     user: adm
//!     file_perms: "664"
//! ```
//!
//! TOML and JSON documents with the same shape are accepted as well; the
//! format follows the file extension. Unknown keys are ignored.

use std::path::Path;

use enforced_fs::ConfigStore;
use serde::{Deserialize, Deserializer};

use crate::Result;

/// The whole configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EnforcerConfig {
    /// Rule records in declaration order; later entries win on identical paths
    #[serde(default)]
    pub folders: Vec<FolderSpec>,
}

impl EnforcerConfig {
    /// Load and deserialize a configuration document.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }
}

/// One raw, unvalidated rule record as written by the operator.
///
/// Empty strings mean "not set". A key written without a value (`user:`,
/// `group: ~`) reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FolderSpec {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub path: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub user: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub group: String,
    /// Octal permission bits for regular files below `path`
    #[serde(default, deserialize_with = "perms_text")]
    pub file_perms: String,
    /// Octal permission bits for directories below `path`
    #[serde(default, deserialize_with = "perms_text")]
    pub dir_perms: String,
}

impl FolderSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn file_perms(mut self, perms: impl Into<String>) -> Self {
        self.file_perms = perms.into();
        self
    }

    pub fn dir_perms(mut self, perms: impl Into<String>) -> Self {
        self.dir_perms = perms.into();
        self
    }

    pub fn carries_policy(&self) -> bool {
        !self.user.is_empty()
            || !self.group.is_empty()
            || !self.file_perms.is_empty()
            || !self.dir_perms.is_empty()
    }
}

fn text_or_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept `file_perms: "664"` as well as an unquoted `file_perms: 664`.
///
/// A bare number is read back as the digits the operator typed, which are
/// then parsed as octal like any other value. A null reads as empty.
fn perms_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Perms {
        Text(String),
        Number(u64),
    }

    Ok(match Option::<Perms>::deserialize(deserializer)? {
        Some(Perms::Text(text)) => text,
        Some(Perms::Number(number)) => number.to_string(),
        None => String::new(),
    })
}
