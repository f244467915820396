use crate::config::WorkflowConfig;
use crate::error::WorkflowResult;
use geas_storage::{read_yaml, DocumentIo};
use std::path::Path;
use std::sync::Arc;

pub const WORKFLOW_FILE_NAME: &str = "workflow.yaml";

/// Loads the workspace policy, falling back to `standard_dev` only when no
/// policy file exists. A file that is present but invalid is an error.
pub struct WorkflowLoader {
    io: Arc<dyn DocumentIo>,
}

impl WorkflowLoader {
    pub fn new(io: Arc<dyn DocumentIo>) -> Self {
        Self { io }
    }

    /// Load and validate the policy at `path`. Falls back to
    /// [`WorkflowConfig::standard_dev`] only when the file is absent.
    pub fn load(&self, path: &Path) -> WorkflowResult<WorkflowConfig> {
        let config = match read_yaml::<WorkflowConfig>(self.io.as_ref(), path)? {
            Some(config) => {
                tracing::debug!(path = %path.display(), workflow = %config.name, "workflow loaded");
                config
            }
            None => {
                tracing::debug!(path = %path.display(), "no workflow file, using standard_dev");
                WorkflowConfig::standard_dev()
            }
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkflowError;
    use geas_storage::{InMemoryFs, LocalFs, StorageError};

    #[test]
    fn missing_file_gives_default() {
        let loader = WorkflowLoader::new(Arc::new(InMemoryFs::new()));
        let cfg = loader.load(Path::new(".geas/config/workflow.yaml")).unwrap();
        assert_eq!(cfg.name, "standard_dev");
    }

    #[test]
    fn malformed_file_is_structural_not_default() {
        let io = Arc::new(InMemoryFs::new());
        io.insert("workflow.yaml", "name: [unterminated");
        let err = WorkflowLoader::new(io).load(Path::new("workflow.yaml")).unwrap_err();
        assert!(matches!(err, WorkflowError::Storage(StorageError::Structural { .. })));
    }

    #[test]
    fn invalid_policy_is_rejected() {
        let io = Arc::new(InMemoryFs::new());
        io.insert(
            "workflow.yaml",
            "name: x\nversion: '1'\nstages:\n  - id: mrp\n    action: SEAL_MRP\n    required_role: agent\n    prerequisite: intent\n",
        );
        let err = WorkflowLoader::new(io).load(Path::new("workflow.yaml")).unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownPrerequisite { .. }));
    }

    #[test]
    fn custom_policy_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(WORKFLOW_FILE_NAME);
        std::fs::write(
            &path,
            "name: hotfix\nversion: '1.1'\nintent_documents:\n  required: [01_request.md]\nstages:\n  - id: req\n    action: SEAL_REQ\n    required_role: human\n  - id: mrp\n    action: SEAL_MRP\n    required_role: agent\n    prerequisite: req\ntest_command: make check\ntest_timeout: 30\n",
        )
        .unwrap();
        let cfg = WorkflowLoader::new(Arc::new(LocalFs::new())).load(&path).unwrap();
        assert_eq!(cfg.name, "hotfix");
        assert_eq!(cfg.test_command, "make check");
        assert_eq!(cfg.intent_documents.required, vec!["01_request.md"]);
        assert_eq!(cfg.stage("mrp").unwrap().prerequisite.as_deref(), Some("req"));
    }
}
