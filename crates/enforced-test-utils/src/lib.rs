//! Shared test utilities for the enforced workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`], a scratch directory tree with explicit modes
//! - [`writer`]: [`RecordingWriter`], an attribute writer that records calls

pub mod tree;
pub mod writer;

pub use tree::TestTree;
pub use writer::{Call, RecordingWriter};
