//! The reconciliation loop
//!
//! Two producers feed one bounded queue drained by a single reconciler
//! thread:
//!
//! ```text
//!  walker thread ──(initial sweep)──┐
//!                                   ├──> bounded queue ──> reconciler thread
//!  notify ──> loop thread ──────────┘         (chmod / chown, serialized)
//! ```
//!
//! The loop thread owns the watch set. On a directory create it widens the
//! watch set and sweeps the new subtree itself.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded, never, select, unbounded};
use enforced_fs::{AttributeWriter, CanonicalPath, FileKind, FileStat};
use enforced_policy::PolicyTree;

use crate::watcher::{Change, WatchSet, classify};
use crate::{Error, FileEvent, Reconciler, Result, walker};

/// Capacity of the queue between producers and the reconciler.
pub const QUEUE_CAPACITY: usize = 1000;

/// Options for the enforcement loop
#[derive(Debug, Clone)]
pub struct EnforceOptions {
    /// If true, decisions are logged as "[dry-run] Would ..." and nothing is
    /// changed.
    pub dry_run: bool,
    pub queue_capacity: usize,
}

impl Default for EnforceOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            queue_capacity: QUEUE_CAPACITY,
        }
    }
}

/// Keep only base folders that currently exist as directories.
///
/// Dropped folders are logged and never checked again.
pub fn accessible_folders(folders: &[CanonicalPath]) -> Vec<PathBuf> {
    folders
        .iter()
        .map(CanonicalPath::to_native)
        .filter(|path| match fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => true,
            Ok(_) => {
                tracing::info!(path = %path.display(), "Skipping inaccessible folder: not a directory");
                false
            }
            Err(e) => {
                tracing::info!(path = %path.display(), error = %e, "Skipping inaccessible folder");
                false
            }
        })
        .collect()
}

/// Keeps a set of directory trees in line with a policy tree.
pub struct Enforcer<W> {
    tree: Arc<PolicyTree>,
    writer: W,
    options: EnforceOptions,
}

impl<W: AttributeWriter + 'static> Enforcer<W> {
    pub fn new(tree: Arc<PolicyTree>, writer: W, options: EnforceOptions) -> Self {
        Self {
            tree,
            writer,
            options,
        }
    }

    /// Sweep and watch `base_folders` until `shutdown` fires or disconnects.
    ///
    /// Watches are armed before the sweep starts. A failed initial sweep or
    /// watch setup ends the loop with an error. On shutdown the queue is
    /// closed and this returns once the reconciler has drained it.
    pub fn run(self, base_folders: &[PathBuf], shutdown: Receiver<()>) -> Result<()> {
        let (queue_tx, queue_rx) = bounded::<FileEvent>(self.options.queue_capacity);
        let reconciler = Reconciler::new(self.tree, self.writer).dry_run(self.options.dry_run);
        let consumer = spawn("reconciler", move || {
            reconciler.drain(queue_rx);
        })?;

        let (notify_tx, notify_rx) = unbounded();
        let mut watches = WatchSet::new(notify_tx)?;
        for folder in base_folders {
            let added = watches.add_tree(folder)?;
            tracing::info!(path = %folder.display(), directories = added, "Watching folder");
        }

        let (fatal_tx, fatal_rx) = bounded::<Error>(1);
        let walker_queue = queue_tx.clone();
        let folders = base_folders.to_vec();
        spawn("walker", move || {
            for folder in &folders {
                match walker::walk(folder, &walker_queue) {
                    Ok(sent) => tracing::info!(path = %folder.display(), entries = sent, "Initial sweep done"),
                    Err(e) => {
                        let _ = fatal_tx.send(e);
                        return;
                    }
                }
            }
        })?;

        let idle = never();
        let mut walker_done = false;
        loop {
            let walker_rx = if walker_done { &idle } else { &fatal_rx };
            select! {
                recv(notify_rx) -> msg => match msg {
                    Ok(Ok(event)) => handle_event(event, &mut watches, &queue_tx)?,
                    Ok(Err(e)) => tracing::error!(error = %e, "Watcher error"),
                    Err(_) => break,
                },
                recv(walker_rx) -> msg => match msg {
                    Ok(e) => return Err(e),
                    // The walker finished cleanly.
                    Err(_) => walker_done = true,
                },
                recv(shutdown) -> _ => {
                    tracing::info!("Shutdown requested");
                    break;
                },
            }
        }

        drop(watches);
        drop(queue_tx);
        consumer
            .join()
            .map_err(|_| Error::Panicked { name: "reconciler" })
    }
}

/// Stat and enqueue the paths of one notification.
///
/// Only a closed queue is an error; per-path failures are logged.
fn handle_event(
    event: notify::Event,
    watches: &mut WatchSet,
    queue: &Sender<FileEvent>,
) -> Result<()> {
    let Some(change) = classify(&event.kind) else {
        return Ok(());
    };

    for path in event.paths {
        let stat = match FileStat::lstat(&path) {
            Ok(stat) => stat,
            Err(e) if e.is_not_found() => {
                tracing::debug!(path = %path.display(), "Entry vanished before it could be examined");
                continue;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to examine changed entry");
                continue;
            }
        };

        if change == Change::Created && stat.kind == FileKind::Directory {
            adopt_directory(&path, watches, queue)?;
        } else {
            queue
                .send(FileEvent::new(path, stat))
                .map_err(|_| Error::QueueClosed)?;
        }
    }
    Ok(())
}

/// Watch and sweep a directory that appeared after startup.
fn adopt_directory(path: &Path, watches: &mut WatchSet, queue: &Sender<FileEvent>) -> Result<()> {
    tracing::debug!(path = %path.display(), "New directory");
    if let Err(e) = watches.add_tree(path) {
        tracing::error!(error = %e, "Failed to watch new directory");
    }
    match walker::walk(path, queue) {
        Ok(_) => Ok(()),
        Err(Error::QueueClosed) => Err(Error::QueueClosed),
        Err(e) => {
            tracing::error!(error = %e, "Failed to sweep new directory");
            Ok(())
        }
    }
}

fn spawn<F>(name: &'static str, body: F) -> Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(format!("enforced-{name}"))
        .spawn(body)
        .map_err(|source| Error::Thread { name, source })
}
