//! In-memory draft store.

use super::{DraftStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory store for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryDraftStore {
    drafts: RwLock<HashMap<String, String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn write(&self, key: &str, json: &str) -> StorageResult<()> {
        let mut drafts = self
            .drafts
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
        drafts.insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let drafts = self
            .drafts
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
        Ok(drafts.get(key).cloned())
    }

    fn clear(&self, key: &str) -> StorageResult<()> {
        let mut drafts = self
            .drafts
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
        drafts.remove(key);
        Ok(())
    }
}
