//! Depth-first sweep of a directory tree into the event queue

use std::io;
use std::path::Path;

use crossbeam_channel::Sender;
use enforced_fs::FileStat;
use walkdir::WalkDir;

use crate::{Error, FileEvent, Result};

/// Enqueue `root` and every entry below it, parents before children and
/// siblings in file-name order.
///
/// Symlinks are reported as such and never followed, `root` included.
/// Entries that vanish mid-walk are skipped; any other traversal error
/// aborts the walk. Blocks while the queue is full.
///
/// Returns the number of events sent.
pub fn walk(root: &Path, queue: &Sender<FileEvent>) -> Result<usize> {
    let mut sent = 0;
    for entry in tree(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_vanished(&e) => {
                tracing::debug!(path = ?e.path(), "Entry vanished during walk");
                continue;
            }
            Err(e) => return Err(Error::walk(root, e)),
        };

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) if is_vanished(&e) => {
                tracing::debug!(path = %entry.path().display(), "Entry vanished during walk");
                continue;
            }
            Err(e) => return Err(Error::walk(root, e)),
        };

        let event = FileEvent::new(entry.into_path(), FileStat::from_metadata(&metadata));
        queue.send(event).map_err(|_| Error::QueueClosed)?;
        sent += 1;
    }

    tracing::debug!(root = %root.display(), sent, "Walk finished");
    Ok(sent)
}

/// Every directory at or below `root`, same order and rules as [`walk`].
pub(crate) fn directories(root: &Path) -> impl Iterator<Item = Result<std::path::PathBuf>> + '_ {
    tree(root).filter_map(move |entry| match entry {
        Ok(entry) if entry.file_type().is_dir() => Some(Ok(entry.into_path())),
        Ok(_) => None,
        Err(e) if is_vanished(&e) => None,
        Err(e) => Some(Err(Error::walk(root, e))),
    })
}

fn tree(root: &Path) -> walkdir::IntoIter {
    WalkDir::new(root)
        .follow_links(false)
        .follow_root_links(false)
        .sort_by_file_name()
        .into_iter()
}

fn is_vanished(e: &walkdir::Error) -> bool {
    e.io_error()
        .is_some_and(|io| io.kind() == io::ErrorKind::NotFound)
}
