use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Closed enumeration of integrity defects the verification engine can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    // chain
    SequenceGap,
    ChainBroken,
    EventTampered,
    HeadMismatch,
    // signatures
    IdentityNotFound,
    KeyMismatch,
    KeyRevoked,
    InvalidSignature,
    // workflow
    StageMissing,
    RoleViolation,
    PrerequisiteMissing,
    // content
    FileModified,
    FileMissing,
}

impl ViolationCode {
    /// Wire name, e.g. `CHAIN_BROKEN`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::SequenceGap => "SEQUENCE_GAP",
            ViolationCode::ChainBroken => "CHAIN_BROKEN",
            ViolationCode::EventTampered => "EVENT_TAMPERED",
            ViolationCode::HeadMismatch => "HEAD_MISMATCH",
            ViolationCode::IdentityNotFound => "IDENTITY_NOT_FOUND",
            ViolationCode::KeyMismatch => "KEY_MISMATCH",
            ViolationCode::KeyRevoked => "KEY_REVOKED",
            ViolationCode::InvalidSignature => "INVALID_SIGNATURE",
            ViolationCode::StageMissing => "STAGE_MISSING",
            ViolationCode::RoleViolation => "ROLE_VIOLATION",
            ViolationCode::PrerequisiteMissing => "PREREQUISITE_MISSING",
            ViolationCode::FileModified => "FILE_MODIFIED",
            ViolationCode::FileMissing => "FILE_MISSING",
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single integrity defect, collected into a validation result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub code: ViolationCode,
    pub message: String,
    pub event_sequence: Option<u64>,
    pub details: Option<Value>,
}

impl Violation {
    /// A violation not yet tied to an event.
    pub fn new(code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            event_sequence: None,
            details: None,
        }
    }

    /// Attach the sequence number of the offending event.
    pub fn at(mut self, sequence: u64) -> Self {
        self.event_sequence = Some(sequence);
        self
    }

    /// Attach an `{expected, actual}` pair.
    pub fn expected_actual(mut self, expected: impl Into<Value>, actual: impl Into<Value>) -> Self {
        self.details = Some(serde_json::json!({
            "expected": expected.into(),
            "actual": actual.into(),
        }));
        self
    }

    /// Attach free-form JSON context.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.event_sequence {
            Some(seq) => write!(f, "[{}] event {}: {}", self.code, seq, self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}
