//! Reconciler implementation
//!
//! The Reconciler compares one observed file against its effective policy
//! and issues the `chmod`/`chown` calls needed to close the gap.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use enforced_fs::{AttributeWriter, FileKind, Mode};
use enforced_policy::PolicyTree;

use crate::FileEvent;

/// A single attribute change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Chmod { mode: Mode },
    Chown { uid: u32, gid: u32 },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chmod { mode } => write!(f, "change permissions to {mode}"),
            Self::Chown { uid, gid } => write!(f, "change ownership to {uid}:{gid}"),
        }
    }
}

/// Outcome of reconciling one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub path: PathBuf,
    /// The entry was neither a directory nor a regular file
    pub skipped: bool,
    /// Actions applied, or in dry-run mode the actions that would have been
    pub actions: Vec<Action>,
    /// Failed actions, one message each
    pub errors: Vec<String>,
}

impl ReconcileReport {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            skipped: false,
            actions: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Nothing needed changing.
    pub fn is_clean(&self) -> bool {
        self.actions.is_empty() && self.errors.is_empty()
    }
}

/// Serialized consumer turning observations into attribute changes.
pub struct Reconciler<W> {
    tree: Arc<PolicyTree>,
    writer: W,
    dry_run: bool,
}

impl<W: AttributeWriter> Reconciler<W> {
    pub fn new(tree: Arc<PolicyTree>, writer: W) -> Self {
        Self {
            tree,
            writer,
            dry_run: false,
        }
    }

    /// Log decisions without calling the writer.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The changes `event` calls for, in application order.
    ///
    /// Unmanaged kinds plan nothing. An empty user or group in the effective
    /// policy keeps the observed id. A mode is only compared when the policy
    /// sets a non-zero one for the entry's kind.
    pub fn plan(&self, event: &FileEvent) -> Vec<Action> {
        let stat = &event.stat;
        let policy = self.tree.resolve(&event.path);
        let mut actions = Vec::new();

        let wanted = match stat.kind {
            FileKind::Directory => policy.attrs.dir_mode,
            FileKind::Regular => policy.attrs.file_mode,
            FileKind::Symlink | FileKind::Special => return actions,
        };
        if let Some(mode) = wanted
            && !mode.is_zero()
            && mode != stat.mode
        {
            actions.push(Action::Chmod { mode });
        }

        let uid = policy.attrs.user.as_ref().map_or(stat.uid, |u| u.id);
        let gid = policy.attrs.group.as_ref().map_or(stat.gid, |g| g.id);
        if (uid, gid) != (stat.uid, stat.gid) {
            actions.push(Action::Chown { uid, gid });
        }

        actions
    }

    /// Plan and apply. Failures are logged and reported, never retried.
    pub fn reconcile(&self, event: &FileEvent) -> ReconcileReport {
        let mut report = ReconcileReport::new(event.path.clone());
        let path = &event.path;
        tracing::debug!(path = %path.display(), "Processing file");

        if !event.stat.kind.is_managed() {
            tracing::info!(
                path = %path.display(),
                kind = %event.stat.kind,
                "Skipping file: neither regular file nor directory"
            );
            report.skipped = true;
            return report;
        }

        for action in self.plan(event) {
            if self.dry_run {
                tracing::info!(path = %path.display(), "[dry-run] Would {action}");
                report.actions.push(action);
                continue;
            }

            tracing::info!(path = %path.display(), "Going to {action}");
            let result = match action {
                Action::Chmod { mode } => self.writer.set_mode(path, mode),
                Action::Chown { uid, gid } => self.writer.set_owner(path, uid, gid),
            };
            match result {
                Ok(()) => report.actions.push(action),
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to {action}");
                    report.errors.push(e.to_string());
                }
            }
        }

        report
    }

    /// Reconcile events until every sender is dropped. Returns how many
    /// events were handled.
    pub fn drain(&self, events: Receiver<FileEvent>) -> usize {
        let mut handled = 0;
        for event in events.iter() {
            let report = self.reconcile(&event);
            if !report.is_clean() {
                tracing::debug!(?report, "Reconciled");
            }
            handled += 1;
        }
        tracing::debug!(handled, "Event queue drained");
        handled
    }
}
