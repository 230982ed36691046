//! Filesystem primitives for the enforced daemon
//!
//! Provides canonical absolute paths, format-agnostic config loading,
//! `lstat` snapshots, and the seam through which `chmod`/`chown` are issued.

pub mod attrs;
pub mod config;
pub mod error;
pub mod io;
pub mod mode;
pub mod path;
pub mod stat;

pub use attrs::{AttributeWriter, SystemAttributes};
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use mode::Mode;
pub use path::CanonicalPath;
pub use stat::{FileKind, FileStat};
