use geas_crypto::CryptoError;
use geas_identity::{IdentityError, KeyError};
use geas_storage::StorageError;
use geas_types::LedgerAction;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("payload does not match action {action}: expected {expected} payload")]
    PayloadMismatch {
        action: LedgerAction,
        expected: &'static str,
    },

    #[error("malformed {action} payload: {message}")]
    MalformedPayload {
        action: LedgerAction,
        message: String,
    },

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failures of the sealing operations. All are raised before anything is
/// appended, so a failed seal leaves the ledger untouched.
#[derive(Debug, thiserror::Error)]
pub enum SealError {
    #[error("ledger integrity check failed ({0} violation(s)); refusing to append")]
    BrokenChain(usize),

    #[error("unknown seal target '{0}': expected req, specs, plan or mrp")]
    UnknownTarget(String),

    #[error("document not found: {}", .0.display())]
    MissingDocument(PathBuf),

    #[error("document path '{0}' must be relative to the bolt directory")]
    UnsafeDocumentPath(String),

    #[error("identity '{0}' is not registered")]
    UnknownIdentity(String),

    #[error("resolved private key for '{0}' does not match its registered active key")]
    KeyMismatch(String),

    #[error("cannot approve: no SEAL_MRP event in the ledger")]
    MrpNotSealed,

    #[error("only human identities may approve; '{name}' is {role}")]
    NotHuman { name: String, role: String },

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
