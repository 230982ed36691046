//! `lstat` snapshots of files under enforcement

use std::fs::{self, Metadata};
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::Path;

use crate::{Error, Mode, Result};

/// What kind of filesystem object a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Directory,
    Regular,
    Symlink,
    /// Sockets, block and character devices, FIFOs
    Special,
}

impl FileKind {
    pub fn is_managed(self) -> bool {
        matches!(self, Self::Directory | Self::Regular)
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Directory => "directory",
            Self::Regular => "regular file",
            Self::Symlink => "symlink",
            Self::Special => "special file",
        };
        f.write_str(name)
    }
}

/// Ownership, permission bits and kind of one filesystem object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub uid: u32,
    pub gid: u32,
    pub mode: Mode,
    pub kind: FileKind,
}

impl FileStat {
    /// Stat `path` without following a trailing symlink.
    pub fn lstat(path: &Path) -> Result<Self> {
        let metadata = fs::symlink_metadata(path).map_err(|source| Error::Stat {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_metadata(&metadata))
    }

    pub fn from_metadata(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        let kind = if file_type.is_dir() {
            FileKind::Directory
        } else if file_type.is_file() {
            FileKind::Regular
        } else if file_type.is_symlink() {
            FileKind::Symlink
        } else {
            debug_assert!(
                file_type.is_socket()
                    || file_type.is_fifo()
                    || file_type.is_block_device()
                    || file_type.is_char_device()
            );
            FileKind::Special
        };

        Self {
            uid: metadata.uid(),
            gid: metadata.gid(),
            mode: Mode::from_bits(metadata.mode()),
            kind,
        }
    }
}
