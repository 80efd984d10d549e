//! Persistence backends for the history cache.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::StorageError;

/// Fixed key the serialized history list lives under.
pub const STORAGE_KEY: &str = "content-generation-history";

const TREE_HISTORY: &str = "history";

/// Storage for one serialized history list.
pub trait HistoryBackend {
    fn read(&self) -> Result<Option<Vec<u8>>, StorageError>;
    fn write(&self, bytes: &[u8]) -> Result<(), StorageError>;
    fn erase(&self) -> Result<(), StorageError>;
}

/// Sled-based backend. Writes are flushed before returning.
#[derive(Clone)]
pub struct SledHistoryBackend {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledHistoryBackend {
    /// Open (or create) a sled database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path.as_ref()).map_err(|e| {
            StorageError::Backend(format!(
                "Failed to open history database {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let tree = db.open_tree(TREE_HISTORY)?;
        Ok(Self { db, tree })
    }

    pub fn db(&self) -> &sled::Db {
        &self.db
    }
}

impl HistoryBackend for SledHistoryBackend {
    fn read(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.tree.get(STORAGE_KEY)?.map(|v| v.to_vec()))
    }

    fn write(&self, bytes: &[u8]) -> Result<(), StorageError> {
        self.tree.insert(STORAGE_KEY, bytes)?;
        self.tree.flush()?;
        Ok(())
    }

    fn erase(&self) -> Result<(), StorageError> {
        self.tree.remove(STORAGE_KEY)?;
        self.tree.flush()?;
        Ok(())
    }
}

/// In-memory backend. Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryHistoryBackend {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
}

impl HistoryBackend for MemoryHistoryBackend {
    fn read(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.slot.lock().clone())
    }

    fn write(&self, bytes: &[u8]) -> Result<(), StorageError> {
        *self.slot.lock() = Some(bytes.to_vec());
        Ok(())
    }

    fn erase(&self) -> Result<(), StorageError> {
        *self.slot.lock() = None;
        Ok(())
    }
}
