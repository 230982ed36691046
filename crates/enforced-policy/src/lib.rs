//! Policy engine for the enforced daemon.
//!
//! Rule records from the configuration are validated and compiled into a
//! [`PolicyTree`], a trie keyed by path component. The effective policy for
//! any path is the field-wise override merge of every node on the way from
//! `/` down to the deepest node matching that path.
//!
//! ```text
//! folders:                       tree:
//!   /var       user=www-data       /
//!              dir_perms=775       ├── var      [user, dir]
//!   /var/site  group=www-editors   │   └── site [group]
//!   /lib/folder2 user=adm          └── lib
//!              file_perms=664          └── folder2 [user, file]
//! ```
//!
//! Resolving `/var/site/x` yields `user=www-data, group=www-editors,
//! dir=0775`.

pub mod base;
pub mod config;
pub mod error;
pub mod ids;
pub mod resolve;
pub mod rule;
pub mod tree;

pub use config::{EnforcerConfig, FolderSpec};
pub use error::{Error, Result};
pub use ids::{IdResolver, StaticIds, SystemIds};
pub use resolve::EffectivePolicy;
pub use rule::{Account, Attrs, Rule};
pub use tree::{PolicyNode, PolicyTree, TreeBuilder};
