use crate::keys::KeySource;
use geas_crypto::CryptoError;
use geas_storage::StorageError;
use std::path::PathBuf;

/// Private key resolution failures. Fatal to the operation requesting a signature.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("invalid identity name '{0}': must not contain path separators")]
    InvalidIdentityName(String),

    #[error("private key for '{name}' not found in ${variable} or {}", path.display())]
    KeyNotFound {
        name: String,
        variable: String,
        path: PathBuf,
    },

    #[error("invalid private key in {origin}: {reason}")]
    KeyInvalid { origin: KeySource, reason: String },

    #[error("cannot write key file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no home directory to place the key directory in")]
    NoHomeDirectory,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity '{0}' already exists")]
    DuplicateIdentity(String),

    #[error("identity '{0}' not found")]
    IdentityNotFound(String),

    #[error("invalid identity: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

pub type IdentityResult<T> = Result<T, IdentityError>;
