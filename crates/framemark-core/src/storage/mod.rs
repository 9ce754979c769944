//! Draft store abstraction.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryDraftStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileDraftStore;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value contract for draft persistence.
///
/// Any key-value store qualifies. Writes are fire-and-forget from the
/// engine's perspective: failures are logged, never surfaced, and a stale
/// write completing after the session closes is harmless.
pub trait DraftStore {
    /// Store the draft JSON under a key.
    fn write(&self, key: &str, json: &str) -> StorageResult<()>;

    /// Fetch the draft JSON for a key, `None` when absent.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Remove any draft stored under a key.
    fn clear(&self, key: &str) -> StorageResult<()>;
}

impl<T: DraftStore + ?Sized> DraftStore for std::sync::Arc<T> {
    fn write(&self, key: &str, json: &str) -> StorageResult<()> {
        (**self).write(key, json)
    }

    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn clear(&self, key: &str) -> StorageResult<()> {
        (**self).clear(key)
    }
}
