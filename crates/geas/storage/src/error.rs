use std::path::PathBuf;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted document failed to parse or does not match its schema.
    #[error("malformed document {}: {message}", path.display())]
    Structural { path: PathBuf, message: String },
}

impl StorageError {
    /// Classify an I/O error; `NotFound` becomes [`StorageError::NotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound { path }
        } else {
            StorageError::Io { path, source }
        }
    }

    pub fn structural(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        StorageError::Structural {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}
