//! File-based draft store.

use super::{DraftStore, StorageError, StorageResult};
use std::fs;
use std::path::PathBuf;

/// Stores drafts as JSON files in a directory, one file per target key.
pub struct FileDraftStore {
    base_path: PathBuf,
}

impl FileDraftStore {
    /// Create a store rooted at the given directory, creating it if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StorageError::Io(format!("Failed to create draft directory: {e}")))?;
        }
        Ok(Self { base_path })
    }

    /// Create a store in the platform data directory
    /// (`framemark/drafts` under the local data dir).
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("framemark").join("drafts"))
    }

    /// Map a target key to a filesystem-safe path.
    fn draft_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{safe}.json"))
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl DraftStore for FileDraftStore {
    fn write(&self, key: &str, json: &str) -> StorageResult<()> {
        let path = self.draft_path(key);
        fs::write(&path, json)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {e}", path.display())))
    }

    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.draft_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {e}", path.display())))
    }

    fn clear(&self, key: &str) -> StorageResult<()> {
        let path = self.draft_path(key);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| StorageError::Io(format!("Failed to delete {}: {e}", path.display())))?;
        }
        Ok(())
    }
}
