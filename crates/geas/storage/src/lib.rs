//! # geas-storage
//!
//! The file-existence/read/write seam every GEAS document passes through.
//!
//! [`DocumentIo`] is implemented by [`LocalFs`] for real workspaces and by
//! [`InMemoryFs`] for tests. The [`codec`] helpers turn documents into typed
//! values and map parse failures to [`StorageError::Structural`], which is
//! always fatal: a malformed ledger or identity store is never repaired.

#![deny(unsafe_code)]

pub mod codec;
pub mod error;
pub mod fs;
pub mod memory;

pub use codec::{read_json, read_yaml, write_json, write_yaml};
pub use error::{StorageError, StorageResult};
pub use fs::LocalFs;
pub use memory::InMemoryFs;

use std::path::{Component, Path};

/// Byte-level access to persisted documents.
pub trait DocumentIo: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Read the whole file. Absence is [`StorageError::NotFound`].
    fn read(&self, path: &Path) -> StorageResult<Vec<u8>>;

    /// Replace the whole file, creating parent directories as needed.
    fn write(&self, path: &Path, bytes: &[u8]) -> StorageResult<()>;
}

/// Whether `relative` names something strictly inside the directory it is
/// joined to: non-empty, no root or drive prefix, no `.` or `..` components.
pub fn is_safe_relative(relative: &str) -> bool {
    let path = Path::new(relative);
    !relative.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}
