//! Enforcement engine for the enforced daemon
//!
//! This crate turns a [`PolicyTree`](enforced_policy::PolicyTree) into
//! ongoing filesystem changes:
//!
//! - **Reconciler**: compares one `(path, lstat)` observation against its
//!   effective policy and issues `chmod`/`chown` through an
//!   [`AttributeWriter`](enforced_fs::AttributeWriter)
//! - **Walker**: depth-first sweep of a base folder into the event queue
//! - **Watcher**: `notify` adapter arming one non-recursive watch per
//!   directory
//! - **Enforcer**: the loop tying them together around a bounded queue
//!
//! # Architecture
//!
//! ```text
//!                  enforced-cli
//!                       |
//!                 enforced-core
//!                       |
//!          +------------+------------+
//!          |                         |
//!    enforced-policy  ------>   enforced-fs
//! ```

pub mod enforcer;
pub mod error;
pub mod event;
pub mod reconcile;
pub mod walker;
pub mod watcher;

pub use enforcer::{EnforceOptions, Enforcer, QUEUE_CAPACITY, accessible_folders};
pub use error::{Error, Result};
pub use event::FileEvent;
pub use reconcile::{Action, ReconcileReport, Reconciler};
pub use walker::walk;
pub use watcher::{Change, WatchSet, classify};
