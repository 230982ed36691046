//! Filesystem notification adapter.
//!
//! Wraps a `notify` watcher whose callback forwards raw results into an
//! unbounded channel, so the notify thread never blocks on the loop.
//! Directories are watched one by one, non-recursively; new subdirectories
//! are added by the loop as their create events arrive.

use std::path::Path;

use crossbeam_channel::Sender;
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::{Error, Result, walker};

/// The two kinds of notification the loop acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Created,
    AttributesChanged,
}

/// Map a notify event kind to a [`Change`]; everything else is ignored.
pub fn classify(kind: &EventKind) -> Option<Change> {
    match kind {
        EventKind::Create(_) => Some(Change::Created),
        EventKind::Modify(ModifyKind::Metadata(_)) => Some(Change::AttributesChanged),
        _ => None,
    }
}

/// The set of directories currently under watch.
pub struct WatchSet {
    watcher: RecommendedWatcher,
    watched: usize,
}

impl WatchSet {
    /// Create the platform watcher, forwarding every result to `events`.
    pub fn new(events: Sender<notify::Result<Event>>) -> Result<Self> {
        let watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| {
                // The loop is gone only during shutdown.
                let _ = events.send(result);
            },
            Config::default(),
        )
        .map_err(Error::WatchSetup)?;

        Ok(Self {
            watcher,
            watched: 0,
        })
    }

    /// Watch `root` and every directory below it. Returns how many
    /// directories were added.
    pub fn add_tree(&mut self, root: &Path) -> Result<usize> {
        let mut added = 0;
        for dir in walker::directories(root) {
            let dir = dir?;
            self.watcher
                .watch(&dir, RecursiveMode::NonRecursive)
                .map_err(|source| Error::Watch {
                    path: dir.clone(),
                    source,
                })?;
            tracing::debug!(path = %dir.display(), "Watching directory");
            added += 1;
        }
        self.watched += added;
        Ok(added)
    }

    /// Total directories added so far. Removed directories are not
    /// subtracted.
    pub fn len(&self) -> usize {
        self.watched
    }

    pub fn is_empty(&self) -> bool {
        self.watched == 0
    }
}
