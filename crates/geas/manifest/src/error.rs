use crate::manifest::TestResultInfo;
use geas_storage::StorageError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("intent not sealed for bolt '{0}'; cannot proceed to proof")]
    IntentNotSealed(String),

    #[error("tests failed with exit code {}", .0.exit_code)]
    TestsFailed(Box<TestResultInfo>),

    #[error("tests timed out after {seconds} seconds")]
    TestsTimedOut {
        seconds: u64,
        result: Box<TestResultInfo>,
    },

    #[error("no files found in scope {0:?}")]
    EmptyScope(Vec<String>),

    #[error("failed to walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type ManifestResult<T> = Result<T, ManifestError>;
