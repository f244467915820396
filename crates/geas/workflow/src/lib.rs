//! # geas-workflow
//!
//! The governance policy a bolt's ledger is checked against: an ordered list
//! of stages, each bound to one ledger action, the role allowed to perform it
//! and optionally the stage that must already be complete.
//!
//! Policies are YAML documents loaded by [`WorkflowLoader`]. When no policy
//! file exists the built-in `standard_dev` policy applies:
//!
//! ```text
//! req (human) -> specs (human) -> plan (agent) -> intent (human) -> mrp (agent)
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod defaults;
pub mod error;
pub mod loader;

pub use config::{IntentDocuments, WorkflowConfig, WorkflowStage};
pub use error::{WorkflowError, WorkflowResult};
pub use loader::{WorkflowLoader, WORKFLOW_FILE_NAME};
