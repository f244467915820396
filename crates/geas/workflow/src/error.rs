use geas_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("workflow '{0}' declares no stages")]
    NoStages(String),

    #[error("stage id '{0}' is declared more than once")]
    DuplicateStage(String),

    #[error("stage '{stage}' requires unknown stage '{prerequisite}'")]
    UnknownPrerequisite { stage: String, prerequisite: String },

    #[error("stage '{0}' lists itself as its prerequisite")]
    SelfPrerequisite(String),

    #[error("test_timeout must be positive")]
    ZeroTimeout,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
