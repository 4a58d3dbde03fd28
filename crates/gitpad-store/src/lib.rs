//! Versioned document store for gitpad.
//!
//! Documents are plain files in a data directory that doubles as a git
//! working tree. Every save is validated for its format and recorded as a
//! commit, which is where the editor's history and restore features come
//! from.

pub mod error;
pub mod format;
pub mod store;
pub mod vcs;

pub use error::{StoreError, StoreResult};
pub use format::Format;
pub use store::{FileStore, DEFAULT_HISTORY_LIMIT};
pub use vcs::{VersionRecord, VersionStore};
