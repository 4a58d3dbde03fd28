//! Version control over the data directory, using the git2 crate.
//!
//! Each document save is a commit touching exactly one file, so a file's
//! history is the list of commits that changed it.

use chrono::{DateTime, Utc};
use git2::Repository;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{StoreError, StoreResult};

/// Identity used for every commit. Documents are anonymous; the repository
/// exists for history, not attribution.
const COMMIT_USER_NAME: &str = "gitpad";
const COMMIT_USER_EMAIL: &str = "gitpad@local";

/// A version of a document as recorded in history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Short commit hash.
    pub hash: String,
    /// Commit timestamp (ISO 8601).
    pub timestamp: String,
    /// Commit message (first line).
    pub message: String,
}

impl VersionRecord {
    fn from_commit(commit: &git2::Commit) -> Self {
        Self {
            hash: commit.id().to_string().chars().take(7).collect(),
            timestamp: DateTime::<Utc>::from_timestamp(commit.time().seconds(), 0)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_default(),
            message: commit.summary().unwrap_or("").to_string(),
        }
    }
}

/// Version store backed by a git repository in the data directory.
pub struct VersionStore {
    working_dir: std::path::PathBuf,
}

impl VersionStore {
    /// Open the repository at `working_dir`, initializing it on first use.
    ///
    /// Commits need an author identity, so one is pinned in the local
    /// repository config. Safe to call on every startup.
    pub fn open(working_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let working_dir = working_dir.as_ref().to_path_buf();
        let repo = match Repository::open(&working_dir) {
            Ok(repo) => repo,
            Err(_) => Repository::init(&working_dir)?,
        };

        let mut config = repo.config()?;
        config.set_str("user.name", COMMIT_USER_NAME)?;
        config.set_str("user.email", COMMIT_USER_EMAIL)?;

        Ok(Self { working_dir })
    }

    /// Open the repository for this working directory.
    fn repo(&self) -> StoreResult<Repository> {
        Ok(Repository::open(&self.working_dir)?)
    }

    /// Stage `filename` and commit it with the given message.
    ///
    /// Saving identical content produces an identical tree; in that case no
    /// commit is recorded and the current head version is returned instead.
    pub fn commit(&self, filename: &str, message: &str) -> StoreResult<VersionRecord> {
        let repo = self.repo()?;
        let mut index = repo.index()?;
        index.add_path(Path::new(filename))?;
        index.write()?;
        let tree_id = index.write_tree()?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None, // Initial commit
        };

        if let Some(parent) = &parent {
            if parent.tree_id() == tree_id {
                return Ok(VersionRecord::from_commit(parent));
            }
        }

        let sig = repo.signature()?;
        let tree = repo.find_tree(tree_id)?;
        let parent_refs: Vec<&git2::Commit> = parent.iter().collect();

        let commit_id = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)?;

        let commit = repo.find_commit(commit_id)?;
        Ok(VersionRecord::from_commit(&commit))
    }

    /// List the versions that changed `filename`, newest first.
    ///
    /// A repository with no commits yet has no history for any file.
    pub fn log(&self, filename: &str, limit: usize) -> StoreResult<Vec<VersionRecord>> {
        let repo = self.repo()?;
        if repo.head().is_err() {
            return Ok(Vec::new());
        }

        let path = Path::new(filename);
        let mut revwalk = repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(git2::Sort::TIME)?;

        let mut records = Vec::new();
        for oid in revwalk {
            if records.len() >= limit {
                break;
            }
            let commit = repo.find_commit(oid?)?;
            if touches_path(&commit, path)? {
                records.push(VersionRecord::from_commit(&commit));
            }
        }
        Ok(records)
    }

    /// Content of `filename` as of the commit named by `reference`.
    pub fn show(&self, filename: &str, reference: &str) -> StoreResult<String> {
        let repo = self.repo()?;
        let object = repo
            .revparse_single(reference)
            .map_err(|_| StoreError::not_found(format!("unknown version: {reference}")))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| StoreError::not_found(format!("unknown version: {reference}")))?;
        let tree = commit.tree()?;
        let entry = tree.get_path(Path::new(filename)).map_err(|_| {
            StoreError::not_found(format!("{filename} does not exist in version {reference}"))
        })?;
        let blob = repo.find_blob(entry.id())?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }
}

/// True when `commit` changed the file at `path`: its blob differs from the
/// first parent's, or the root commit introduced it.
fn touches_path(commit: &git2::Commit, path: &Path) -> StoreResult<bool> {
    let current = tree_entry_id(commit, path)?;
    match commit.parent(0) {
        Ok(parent) => Ok(current != tree_entry_id(&parent, path)?),
        Err(_) => Ok(current.is_some()),
    }
}

fn tree_entry_id(commit: &git2::Commit, path: &Path) -> StoreResult<Option<git2::Oid>> {
    let tree = commit.tree()?;
    Ok(tree.get_path(path).ok().map(|entry| entry.id()))
}
