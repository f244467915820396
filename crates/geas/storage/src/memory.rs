use crate::error::{StorageError, StorageResult};
use crate::DocumentIo;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// In-memory document store for tests.
#[derive(Debug, Default)]
pub struct InMemoryFs {
    files: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
}

impl InMemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document.
    pub fn insert(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), bytes.into());
    }

    pub fn remove(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.write().remove(path)
    }

    /// Every stored path, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.read().keys().cloned().collect()
    }
}

impl DocumentIo for InMemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }

    fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_path_buf(),
            })
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        self.files.write().insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}
