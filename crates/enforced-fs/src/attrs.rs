//! The syscall seam for ownership and permission changes

use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use nix::unistd::{self, Gid, Uid};

use crate::{Error, Mode, Result};

/// Applies permission and ownership changes to a path.
///
/// The daemon calls this only for regular files and directories, so
/// implementations may follow symlinks.
pub trait AttributeWriter: Send + Sync {
    /// `chmod(path, mode)`
    fn set_mode(&self, path: &Path, mode: Mode) -> Result<()>;

    /// `chown(path, uid, gid)`
    fn set_owner(&self, path: &Path, uid: u32, gid: u32) -> Result<()>;
}

/// Writes through to the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAttributes;

impl AttributeWriter for SystemAttributes {
    fn set_mode(&self, path: &Path, mode: Mode) -> Result<()> {
        fs::set_permissions(path, Permissions::from_mode(mode.bits()))
            .map_err(|e| Error::syscall("chmod", path, e))
    }

    fn set_owner(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        unistd::chown(path, Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid)))
            .map_err(|errno| Error::syscall("chown", path, errno.into()))
    }
}

impl<W: AttributeWriter + ?Sized> AttributeWriter for std::sync::Arc<W> {
    fn set_mode(&self, path: &Path, mode: Mode) -> Result<()> {
        (**self).set_mode(path, mode)
    }

    fn set_owner(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        (**self).set_owner(path, uid, gid)
    }
}
