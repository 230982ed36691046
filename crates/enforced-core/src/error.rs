//! Error types for enforced-core

use std::path::PathBuf;

/// Result type for enforced-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop the enforcement loop
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Directory traversal failed for a reason other than a vanished entry
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The platform watcher could not be created
    #[error("Failed to create filesystem watcher: {0}")]
    WatchSetup(#[source] notify::Error),

    /// A directory could not be added to the watch set
    #[error("Failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("Failed to spawn {name} thread: {source}")]
    Thread {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("The {name} thread panicked")]
    Panicked { name: &'static str },

    /// The reconciler stopped accepting events
    #[error("Event queue closed")]
    QueueClosed,
}

impl Error {
    pub(crate) fn walk(root: &std::path::Path, source: walkdir::Error) -> Self {
        let path = source.path().unwrap_or(root).to_path_buf();
        Self::Walk { path, source }
    }
}
