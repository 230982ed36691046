//! Error types for enforced-policy
//!
//! Every variant except `Fs` is a configuration error: the daemon refuses
//! to start on any of them.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Folder #{index} has no path attribute")]
    MissingPath { index: usize },

    #[error("Folder path must be absolute (preceded by '/'): {path}")]
    NonAbsolute { path: String },

    #[error("Could not understand {field} for {path}: {value}")]
    BadPerms {
        path: String,
        field: &'static str,
        value: String,
    },

    #[error("Invalid user for {path}: {user}")]
    InvalidUser { path: String, user: String },

    #[error("Invalid group for {path}: {group}")]
    InvalidGroup { path: String, group: String },

    #[error("No configuration rules found")]
    NoRules,

    #[error("Filesystem error: {0}")]
    Fs(#[from] enforced_fs::Error),
}
