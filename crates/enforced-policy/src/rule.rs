//! Validated rule records and the attributes a tree node carries

use std::fmt;

use enforced_fs::{CanonicalPath, Mode};

use crate::{Error, FolderSpec, IdResolver, Result};

/// A named account with its resolved numeric id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub id: u32,
}

impl Account {
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Policy attributes. Each field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    pub user: Option<Account>,
    pub group: Option<Account>,
    pub file_mode: Option<Mode>,
    pub dir_mode: Option<Mode>,
}

impl Attrs {
    /// A node carries policy iff at least one field is set.
    pub fn carries_policy(&self) -> bool {
        self.user.is_some()
            || self.group.is_some()
            || self.file_mode.is_some()
            || self.dir_mode.is_some()
    }
}

impl fmt::Display for Attrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();
        if let Some(user) = &self.user {
            fields.push(format!("user={user}"));
        }
        if let Some(group) = &self.group {
            fields.push(format!("group={group}"));
        }
        if let Some(mode) = self.file_mode {
            fields.push(format!("file={mode}"));
        }
        if let Some(mode) = self.dir_mode {
            fields.push(format!("dir={mode}"));
        }
        write!(f, "{}", fields.join(" "))
    }
}

/// A validated rule: canonical absolute path plus resolved attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub path: CanonicalPath,
    pub attrs: Attrs,
}

impl Rule {
    /// Validate one configuration entry.
    ///
    /// `index` is the entry's position in the document, used only for error
    /// messages. With `tolerant` set, names missing from the account
    /// databases resolve to id 0 instead of failing.
    pub fn compile(
        spec: &FolderSpec,
        index: usize,
        ids: &dyn IdResolver,
        tolerant: bool,
    ) -> Result<Self> {
        if spec.path.is_empty() {
            return Err(Error::MissingPath { index });
        }

        let path = CanonicalPath::new(&spec.path);
        if !path.is_absolute() {
            return Err(Error::NonAbsolute {
                path: spec.path.clone(),
            });
        }

        let user = if spec.user.is_empty() {
            None
        } else {
            let uid = match ids.user_id(&spec.user) {
                Some(uid) => uid,
                None if tolerant => 0,
                None => {
                    return Err(Error::InvalidUser {
                        path: path.to_string(),
                        user: spec.user.clone(),
                    });
                }
            };
            Some(Account::new(&spec.user, uid))
        };

        let group = if spec.group.is_empty() {
            None
        } else {
            let gid = match ids.group_id(&spec.group) {
                Some(gid) => gid,
                None if tolerant => 0,
                None => {
                    return Err(Error::InvalidGroup {
                        path: path.to_string(),
                        group: spec.group.clone(),
                    });
                }
            };
            Some(Account::new(&spec.group, gid))
        };

        let file_mode = parse_perms(&path, "file_perms", &spec.file_perms)?;
        let dir_mode = parse_perms(&path, "dir_perms", &spec.dir_perms)?;

        Ok(Self {
            path,
            attrs: Attrs {
                user,
                group,
                file_mode,
                dir_mode,
            },
        })
    }
}

fn parse_perms(path: &CanonicalPath, field: &'static str, value: &str) -> Result<Option<Mode>> {
    if value.is_empty() {
        return Ok(None);
    }
    Mode::parse_octal(value)
        .map(Some)
        .ok_or_else(|| Error::BadPerms {
            path: path.to_string(),
            field,
            value: value.to_string(),
        })
}
