//! [`TestTree`] builder for scratch directory trees.

use std::fs::{self, Permissions};
use std::os::unix::fs::{PermissionsExt, symlink};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// A temporary directory whose entries are created with explicit permission
/// bits, independent of the process umask.
///
/// The root is canonicalized so that paths reported by the kernel (for
/// example through inotify) compare equal to the ones built here.
///
/// # Example
///
/// ```rust,no_run
/// use enforced_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.dir("site", 0o700);
/// tree.file("site/index.html", 0o600);
/// assert_eq!(tree.mode_of("site/index.html"), 0o600);
/// ```
pub struct TestTree {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create an empty temporary directory.
    ///
    /// # Panics
    /// Panics if the directory cannot be created or canonicalized.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("TestTree::new: failed to create temp dir");
        let root = temp_dir
            .path()
            .canonicalize()
            .expect("TestTree::new: failed to canonicalize temp dir");
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `rel` below the root.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Create directory `rel` (and any missing parents) with `mode`.
    ///
    /// # Panics
    /// Panics if the directory cannot be created.
    pub fn dir(&self, rel: &str, mode: u32) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).unwrap();
        fs::set_permissions(&path, Permissions::from_mode(mode)).unwrap();
        path
    }

    /// Create regular file `rel` with `mode`. Missing parents are created
    /// with the umask default.
    ///
    /// # Panics
    /// Panics if the file cannot be written.
    pub fn file(&self, rel: &str, mode: u32) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, rel).unwrap();
        fs::set_permissions(&path, Permissions::from_mode(mode)).unwrap();
        path
    }

    /// Create a symlink at `rel` pointing to `target`.
    ///
    /// # Panics
    /// Panics if the link cannot be created.
    pub fn symlink(&self, rel: &str, target: &Path) -> PathBuf {
        let path = self.path(rel);
        symlink(target, &path).unwrap();
        path
    }

    /// Change the permission bits of an existing entry.
    ///
    /// # Panics
    /// Panics if the entry does not exist.
    pub fn chmod(&self, rel: &str, mode: u32) {
        fs::set_permissions(self.path(rel), Permissions::from_mode(mode)).unwrap();
    }

    /// Low nine permission bits of `rel`, without following symlinks.
    ///
    /// # Panics
    /// Panics if the entry cannot be stat-ed.
    pub fn mode_of(&self, rel: &str) -> u32 {
        fs::symlink_metadata(self.path(rel))
            .unwrap_or_else(|e| panic!("Could not stat {rel}: {e}"))
            .permissions()
            .mode()
            & 0o777
    }

    /// Poll until `rel` has permission bits `mode` or `timeout` elapses.
    ///
    /// Returns whether the mode was observed. A missing entry counts as a
    /// mismatch.
    pub fn wait_for_mode(&self, rel: &str, mode: u32, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let current = fs::symlink_metadata(self.path(rel))
                .map(|m| m.permissions().mode() & 0o777)
                .ok();
            if current == Some(mode) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(25));
        }
    }

    /// Write a text file at `rel` with the umask default mode.
    ///
    /// # Panics
    /// Panics if the file cannot be written.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}
