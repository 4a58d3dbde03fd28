//! Document repository over the data directory.
//!
//! Couples plain-file reads and writes with format validation and the
//! version store. Content is validated before it touches disk, so an
//! invalid save can never clobber a good document.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::format::{self, Format};
use crate::vcs::{VersionRecord, VersionStore};

/// How many versions a history request returns at most.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Store for editable documents, one flat directory of files.
pub struct FileStore {
    data_dir: PathBuf,
    vcs: VersionStore,
}

impl FileStore {
    /// Open the store at `data_dir`, creating the directory and its
    /// version history on first use.
    pub async fn open(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).await?;
        let vcs = VersionStore::open(&data_dir)?;
        info!(data_dir = %data_dir.display(), "opened document store");
        Ok(Self { data_dir, vcs })
    }

    /// Directory the documents live in.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Resolve `filename` inside the data directory.
    ///
    /// Filenames are single path components; anything that could point
    /// outside the directory is rejected.
    fn checked_path(&self, filename: &str) -> StoreResult<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename == "."
            || filename == ".."
        {
            return Err(StoreError::invalid_filename(filename));
        }
        Ok(self.data_dir.join(filename))
    }

    /// Read a document, creating it with default content if it does not
    /// exist yet. Creation is itself recorded as the first version.
    pub async fn read(&self, filename: &str) -> StoreResult<String> {
        let path = self.checked_path(filename)?;
        if !path.exists() {
            let created = Utc::now().to_rfc3339();
            let content = format::default_document(filename, &created);
            fs::write(&path, &content).await?;
            self.vcs.commit(filename, &format!("Initial: {filename}"))?;
            info!(filename = %filename, "created new document");
        }
        Ok(fs::read_to_string(&path).await?)
    }

    /// Validate and save a document, recording the save as a new version.
    ///
    /// Validation runs first: invalid content leaves both the file and its
    /// history untouched.
    pub async fn write(&self, filename: &str, content: &str) -> StoreResult<VersionRecord> {
        let path = self.checked_path(filename)?;
        format::validate(filename, content)?;

        fs::write(&path, content).await?;
        let timestamp = Utc::now().to_rfc3339();
        let record = self
            .vcs
            .commit(filename, &format!("Update {filename}: {timestamp}"))?;
        debug!(filename = %filename, version = %record.hash, "saved document");
        Ok(record)
    }

    /// Versions of `filename`, newest first, at most `limit` entries.
    pub fn history(&self, filename: &str, limit: usize) -> StoreResult<Vec<VersionRecord>> {
        self.checked_path(filename)?;
        self.vcs.log(filename, limit)
    }

    /// Put the content of an earlier version back on disk.
    ///
    /// The restore is recorded as a new version on top of the history; the
    /// restored content is returned.
    pub async fn restore(&self, filename: &str, reference: &str) -> StoreResult<String> {
        let path = self.checked_path(filename)?;
        let content = self.vcs.show(filename, reference)?;
        fs::write(&path, &content).await?;
        self.vcs
            .commit(filename, &format!("Restored to version {reference}"))?;
        info!(filename = %filename, reference = %reference, "restored document");
        Ok(content)
    }

    /// Editable documents in the data directory, sorted by name.
    pub async fn list(&self) -> StoreResult<Vec<String>> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if Format::from_path(&name).is_some() {
                files.push(name);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup_store() -> (TempDir, FileStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().join("data")).await.unwrap();
        (temp_dir, store)
    }

    #[tokio::test]
    async fn reading_a_missing_json_file_creates_a_default() {
        let (_temp_dir, store) = setup_store().await;

        let content = store.read("config.json").await.unwrap();
        assert!(content.contains("New File"));
        serde_json::from_str::<serde_json::Value>(&content).unwrap();

        let history = store.history("config.json", DEFAULT_HISTORY_LIMIT).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message, "Initial: config.json");
    }

    #[tokio::test]
    async fn default_documents_match_their_format() {
        let (_temp_dir, store) = setup_store().await;

        let yaml = store.read("pipeline.yaml").await.unwrap();
        serde_yaml::from_str::<serde_yaml::Value>(&yaml).unwrap();

        let xml = store.read("layout.xml").await.unwrap();
        roxmltree::Document::parse(&xml).unwrap();
    }

    #[tokio::test]
    async fn reading_twice_does_not_add_history() {
        let (_temp_dir, store) = setup_store().await;
        store.read("config.json").await.unwrap();
        store.read("config.json").await.unwrap();

        let history = store.history("config.json", DEFAULT_HISTORY_LIMIT).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn written_content_reads_back_byte_identical() {
        let (_temp_dir, store) = setup_store().await;
        let content = "{\n  \"tabs\": [1, 2],\n  \"note\": \"héllo\"\n}";

        store.write("settings.json", content).await.unwrap();
        assert_eq!(store.read("settings.json").await.unwrap(), content);
    }

    #[tokio::test]
    async fn invalid_content_leaves_file_and_history_untouched() {
        let (_temp_dir, store) = setup_store().await;
        store.write("config.json", "{\"v\": 1}").await.unwrap();

        let err = store.write("config.json", "{broken").await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        assert_eq!(store.read("config.json").await.unwrap(), "{\"v\": 1}");
        let history = store.history("config.json", DEFAULT_HISTORY_LIMIT).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn each_save_adds_one_version_newest_first() {
        let (_temp_dir, store) = setup_store().await;
        for i in 1..=3 {
            store
                .write("config.json", &format!("{{\"v\": {i}}}"))
                .await
                .unwrap();
        }

        let history = store.history("config.json", DEFAULT_HISTORY_LIMIT).unwrap();
        assert_eq!(history.len(), 3);
        assert!(history[0].message.starts_with("Update config.json:"));

        let capped = store.history("config.json", 2).unwrap();
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].hash, history[0].hash);
    }

    #[tokio::test]
    async fn unknown_extensions_are_stored_without_validation() {
        let (_temp_dir, store) = setup_store().await;

        store.write("notes.txt", "{{{ not json at all").await.unwrap();
        assert_eq!(
            store.read("notes.txt").await.unwrap(),
            "{{{ not json at all"
        );
    }

    #[tokio::test]
    async fn restore_brings_back_old_content_as_a_new_version() {
        let (_temp_dir, store) = setup_store().await;
        let first = store.write("config.json", "{\"v\": 1}").await.unwrap();
        store.write("config.json", "{\"v\": 2}").await.unwrap();

        let restored = store.restore("config.json", &first.hash).await.unwrap();
        assert_eq!(restored, "{\"v\": 1}");
        assert_eq!(store.read("config.json").await.unwrap(), "{\"v\": 1}");

        let history = store.history("config.json", DEFAULT_HISTORY_LIMIT).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(
            history[0].message,
            format!("Restored to version {}", first.hash)
        );
    }

    #[tokio::test]
    async fn restore_with_unknown_version_fails() {
        let (_temp_dir, store) = setup_store().await;
        store.write("config.json", "{}").await.unwrap();

        let err = store.restore("config.json", "badc0de").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn filenames_that_leave_the_data_directory_are_rejected() {
        let (_temp_dir, store) = setup_store().await;

        for bad in ["../evil.json", "a/b.json", "a\\b.json", ".", "..", ""] {
            let err = store.read(bad).await.unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidFilename(_)),
                "{bad:?} was not rejected"
            );
            assert!(err.is_client_error());
        }
    }

    #[tokio::test]
    async fn list_returns_only_editable_files_sorted() {
        let (_temp_dir, store) = setup_store().await;
        store.write("b.yaml", "name: b").await.unwrap();
        store.write("a.json", "{}").await.unwrap();
        store.write("notes.txt", "plain").await.unwrap();
        std::fs::create_dir(store.data_dir().join("nested.json")).unwrap();

        let files = store.list().await.unwrap();
        assert_eq!(files, vec!["a.json".to_string(), "b.yaml".to_string()]);
    }

    #[tokio::test]
    async fn list_on_empty_store_is_empty() {
        let (_temp_dir, store) = setup_store().await;
        assert!(store.list().await.unwrap().is_empty());
    }
}
