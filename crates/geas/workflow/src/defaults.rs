use crate::config::{IntentDocuments, WorkflowConfig, WorkflowStage};
use geas_types::{IdentityRole, LedgerAction};

impl WorkflowConfig {
    /// Built-in policy used when a workspace has no workflow file.
    pub fn standard_dev() -> Self {
        Self {
            name: "standard_dev".into(),
            version: "1.0".into(),
            intent_documents: IntentDocuments {
                required: vec!["01_request.md".into(), "02_specs.md".into()],
                optional: vec!["03_plan.md".into()],
            },
            stages: vec![
                WorkflowStage::new("req", LedgerAction::SealReq, IdentityRole::Human)
                    .described("Seal Requirements"),
                WorkflowStage::new("specs", LedgerAction::SealSpecs, IdentityRole::Human)
                    .after("req")
                    .described("Seal Specifications"),
                WorkflowStage::new("plan", LedgerAction::SealPlan, IdentityRole::Agent)
                    .after("specs")
                    .described("Seal Implementation Plan"),
                WorkflowStage::new("intent", LedgerAction::SealIntent, IdentityRole::Human)
                    .after("plan")
                    .described("Seal Intent (Req + Specs + Plan)"),
                WorkflowStage::new("mrp", LedgerAction::SealMrp, IdentityRole::Agent)
                    .after("intent")
                    .described("Seal Merge Request Package"),
            ],
            test_command: "cargo test".into(),
            test_timeout: 300,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self::standard_dev()
    }
}
