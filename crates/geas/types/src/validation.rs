//! Result shapes shared by the four validators.
//!
//! Each carries `valid`, the ordered violations found in a full pass, and a
//! kind-specific counter. `valid` is always derived from the violation list.

use crate::violation::Violation;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    Pass,
    Fail,
    /// Validator was not requested for this run.
    Skipped,
}

impl ValidationStatus {
    pub fn from_valid(valid: bool) -> Self {
        if valid {
            ValidationStatus::Pass
        } else {
            ValidationStatus::Fail
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainValidationResult {
    pub valid: bool,
    pub violations: Vec<Violation>,
    pub event_count: usize,
}

impl ChainValidationResult {
    pub fn new(violations: Vec<Violation>, event_count: usize) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
            event_count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignatureValidationResult {
    pub valid: bool,
    pub violations: Vec<Violation>,
    pub verified_count: usize,
    /// Events carrying no identity block; each is also an `IDENTITY_NOT_FOUND`.
    pub unsigned_count: usize,
}

impl SignatureValidationResult {
    pub fn new(violations: Vec<Violation>, verified_count: usize, unsigned_count: usize) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
            verified_count,
            unsigned_count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowValidationResult {
    pub valid: bool,
    pub violations: Vec<Violation>,
    pub completed_stages: Vec<String>,
    pub missing_stages: Vec<String>,
}

impl WorkflowValidationResult {
    pub fn new(
        violations: Vec<Violation>,
        completed_stages: Vec<String>,
        missing_stages: Vec<String>,
    ) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
            completed_stages,
            missing_stages,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentValidationResult {
    pub valid: bool,
    pub violations: Vec<Violation>,
    pub checked_files: usize,
    pub modified_files: usize,
}

impl ContentValidationResult {
    /// `modified_files` counts missing files as well as changed ones.
    pub fn new(violations: Vec<Violation>, checked_files: usize, modified_files: usize) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
            checked_files,
            modified_files,
        }
    }
}
