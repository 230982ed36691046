//! [`RecordingWriter`], an in-memory [`AttributeWriter`].

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use enforced_fs::{AttributeWriter, Error, Mode, Result};

/// One recorded attribute change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetMode { path: PathBuf, mode: Mode },
    SetOwner { path: PathBuf, uid: u32, gid: u32 },
}

impl Call {
    pub fn set_mode(path: impl Into<PathBuf>, mode: u32) -> Self {
        Self::SetMode {
            path: path.into(),
            mode: Mode::from_bits(mode),
        }
    }

    pub fn set_owner(path: impl Into<PathBuf>, uid: u32, gid: u32) -> Self {
        Self::SetOwner {
            path: path.into(),
            uid,
            gid,
        }
    }
}

/// Records every call instead of touching the filesystem.
///
/// Clones share the same log, so a clone handed to the code under test can
/// be inspected afterwards through the original.
#[derive(Debug, Clone, Default)]
pub struct RecordingWriter {
    calls: Arc<Mutex<Vec<Call>>>,
    fail: bool,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer that records each call and then fails it with `EPERM`.
    pub fn failing() -> Self {
        Self {
            calls: Arc::default(),
            fail: true,
        }
    }

    /// Snapshot of the calls so far, in order.
    ///
    /// # Panics
    /// Panics if the log mutex is poisoned.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, path: &Path, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(Error::syscall(
                op,
                path,
                io::Error::from(io::ErrorKind::PermissionDenied),
            ));
        }
        Ok(())
    }
}

impl AttributeWriter for RecordingWriter {
    fn set_mode(&self, path: &Path, mode: Mode) -> Result<()> {
        self.record(
            "chmod",
            path,
            Call::SetMode {
                path: path.to_path_buf(),
                mode,
            },
        )
    }

    fn set_owner(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        self.record("chown", path, Call::set_owner(path, uid, gid))
    }
}
