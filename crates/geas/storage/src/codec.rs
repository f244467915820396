//! Typed JSON and YAML documents on top of [`DocumentIo`].
//!
//! Readers return `Ok(None)` when the file is absent so callers can choose a
//! default; anything present but unparseable is a structural error.

use crate::error::{StorageError, StorageResult};
use crate::DocumentIo;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

fn read_optional(io: &dyn DocumentIo, path: &Path) -> StorageResult<Option<Vec<u8>>> {
    match io.read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Read and parse a JSON document. `Ok(None)` when the file does not exist.
pub fn read_json<T: DeserializeOwned>(io: &dyn DocumentIo, path: &Path) -> StorageResult<Option<T>> {
    let Some(bytes) = read_optional(io, path)? else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StorageError::structural(path, e))
}

/// Pretty-printed with a trailing newline.
pub fn write_json<T: Serialize + ?Sized>(io: &dyn DocumentIo, path: &Path, value: &T) -> StorageResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|e| StorageError::structural(path, e))?;
    bytes.push(b'\n');
    io.write(path, &bytes)
}

/// YAML counterpart of [`read_json`].
pub fn read_yaml<T: DeserializeOwned>(io: &dyn DocumentIo, path: &Path) -> StorageResult<Option<T>> {
    let Some(bytes) = read_optional(io, path)? else {
        return Ok(None);
    };
    serde_yaml::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StorageError::structural(path, e))
}

pub fn write_yaml<T: Serialize + ?Sized>(io: &dyn DocumentIo, path: &Path, value: &T) -> StorageResult<()> {
    let text = serde_yaml::to_string(value).map_err(|e| StorageError::structural(path, e))?;
    io.write(path, text.as_bytes())
}
