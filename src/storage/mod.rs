//! Progress slot persistence.
//!
//! The entire hunt state is a single integer written as its decimal string
//! to one named slot. [`SledSlot`] is the durable implementation backed by an
//! embedded sled tree; [`MemorySlot`] backs tests and throwaway runs.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

const TREE_PROGRESS: &str = "stamprally";
const SLOT_KEY: &[u8] = b"progress";

/// Errors that can arise while reading or writing the progress slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single named slot in a synchronous key-value store.
///
/// Implementations are injected into the progress store so tests can
/// substitute fakes instead of touching real persistent storage.
pub trait ProgressSlot: Send {
    /// Read the stored value. `None` when the slot has never been written.
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Overwrite the slot. The value must be durable once this returns.
    fn write(&self, value: &str) -> Result<(), StorageError>;
}

/// Sled-backed progress slot rooted at a directory on disk.
pub struct SledSlot {
    _db: sled::Db,
    tree: sled::Tree,
}

impl SledSlot {
    /// Open (or create) the progress database rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let tree = db.open_tree(TREE_PROGRESS)?;
        Ok(Self { _db: db, tree })
    }
}

impl ProgressSlot for SledSlot {
    fn read(&self) -> Result<Option<String>, StorageError> {
        let Some(bytes) = self.tree.get(SLOT_KEY)? else {
            return Ok(None);
        };
        // Non-UTF-8 contents degrade to an unparsable string, which the
        // progress store treats as "nothing completed".
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn write(&self, value: &str) -> Result<(), StorageError> {
        self.tree.insert(SLOT_KEY, value.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }
}

/// In-memory slot for tests and ephemeral runs. Clones share the same cell,
/// so a test can hold one handle while the store owns another.
#[derive(Clone, Default)]
pub struct MemorySlot {
    cell: Arc<Mutex<Option<String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-existing stored value.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            cell: Arc::new(Mutex::new(Some(value.into()))),
        }
    }

    /// Snapshot of the currently stored value.
    pub fn stored(&self) -> Option<String> {
        self.cell
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProgressSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .cell
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn write(&self, value: &str) -> Result<(), StorageError> {
        *self.cell.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.to_string());
        Ok(())
    }
}
