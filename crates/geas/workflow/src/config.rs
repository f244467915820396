use crate::error::{WorkflowError, WorkflowResult};
use geas_types::{IdentityRole, LedgerAction};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// One governance step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStage {
    pub id: String,
    /// Ledger action that completes this stage.
    pub action: LedgerAction,
    pub required_role: IdentityRole,
    /// Stage id that must be complete first, in configured order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WorkflowStage {
    pub fn new(id: impl Into<String>, action: LedgerAction, required_role: IdentityRole) -> Self {
        Self {
            id: id.into(),
            action,
            required_role,
            prerequisite: None,
            description: None,
        }
    }

    /// Require stage `prerequisite` to be complete first.
    pub fn after(mut self, prerequisite: impl Into<String>) -> Self {
        self.prerequisite = Some(prerequisite.into());
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Documents certified together by an intent seal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDocuments {
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
}

fn default_test_command() -> String {
    "cargo test".to_string()
}

fn default_test_timeout() -> u64 {
    300
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub intent_documents: IntentDocuments,
    /// Evaluated in this order.
    pub stages: Vec<WorkflowStage>,
    /// Command run by the proof cycle.
    #[serde(default = "default_test_command")]
    pub test_command: String,
    /// Seconds.
    #[serde(default = "default_test_timeout")]
    pub test_timeout: u64,
}

impl WorkflowConfig {
    pub fn stage(&self, id: &str) -> Option<&WorkflowStage> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn stage_ids(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.id.as_str()).collect()
    }

    /// `test_timeout` seconds as a [`Duration`].
    pub fn test_timeout(&self) -> Duration {
        Duration::from_secs(self.test_timeout)
    }

    /// Stage ids unique, every prerequisite names a declared stage.
    ///
    /// A prerequisite declared later in the list is allowed here; the
    /// workflow validator reports it as missing at evaluation time.
    pub fn validate(&self) -> WorkflowResult<()> {
        if self.stages.is_empty() {
            return Err(WorkflowError::NoStages(self.name.clone()));
        }
        let mut ids = HashSet::new();
        for stage in &self.stages {
            if !ids.insert(stage.id.as_str()) {
                return Err(WorkflowError::DuplicateStage(stage.id.clone()));
            }
        }
        for stage in &self.stages {
            if let Some(pre) = &stage.prerequisite {
                if pre == &stage.id {
                    return Err(WorkflowError::SelfPrerequisite(stage.id.clone()));
                }
                if !ids.contains(pre.as_str()) {
                    return Err(WorkflowError::UnknownPrerequisite {
                        stage: stage.id.clone(),
                        prerequisite: pre.clone(),
                    });
                }
            }
        }
        if self.test_timeout == 0 {
            return Err(WorkflowError::ZeroTimeout);
        }
        Ok(())
    }
}
