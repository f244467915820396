use geas_identity::IdentityError;
use geas_ledger::LedgerError;
use geas_storage::StorageError;
use geas_workflow::WorkflowError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("no ledger found at {}", .0.display())]
    LedgerNotFound(PathBuf),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

pub type VerifyResult<T> = Result<T, VerifyError>;
