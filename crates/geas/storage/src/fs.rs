use crate::error::{StorageError, StorageResult};
use crate::DocumentIo;
use std::path::Path;

/// Local filesystem. Writes go to a sibling `.tmp` file and are renamed into
/// place so an interrupted write never leaves a truncated document.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentIo for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| StorageError::io(path, e))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp);
        std::fs::write(&tmp, bytes).map_err(|e| StorageError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| StorageError::io(path, e))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "document written");
        Ok(())
    }
}
