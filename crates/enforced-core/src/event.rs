//! Observations handed from the producers to the reconciler

use std::path::PathBuf;

use enforced_fs::FileStat;

/// An absolute path plus what `lstat` said about it when it was observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub stat: FileStat,
}

impl FileEvent {
    pub fn new(path: impl Into<PathBuf>, stat: FileStat) -> Self {
        Self {
            path: path.into(),
            stat,
        }
    }

    /// Stat `path` now.
    pub fn observe(path: impl Into<PathBuf>) -> enforced_fs::Result<Self> {
        let path = path.into();
        let stat = FileStat::lstat(&path)?;
        Ok(Self { path, stat })
    }
}
