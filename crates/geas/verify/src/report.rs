use geas_types::{
    ChainValidationResult, ContentValidationResult, SignatureValidationResult, ValidationStatus,
    Violation, WorkflowValidationResult,
};
use serde::{Deserialize, Serialize};

/// Aggregated outcome of one verification run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub bolt_id: String,
    /// AND of every validator that ran.
    pub valid: bool,
    pub chain: ChainValidationResult,
    pub signatures: SignatureValidationResult,
    pub workflow: WorkflowValidationResult,
    /// Present only when content checking was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentValidationResult>,
}

impl VerificationReport {
    pub fn new(
        bolt_id: impl Into<String>,
        chain: ChainValidationResult,
        signatures: SignatureValidationResult,
        workflow: WorkflowValidationResult,
        content: Option<ContentValidationResult>,
    ) -> Self {
        let valid = chain.valid
            && signatures.valid
            && workflow.valid
            && content.as_ref().map_or(true, |c| c.valid);
        Self {
            bolt_id: bolt_id.into(),
            valid,
            chain,
            signatures,
            workflow,
            content,
        }
    }

    /// `Skipped` when content was not checked.
    pub fn content_status(&self) -> ValidationStatus {
        match &self.content {
            Some(c) => ValidationStatus::from_valid(c.valid),
            None => ValidationStatus::Skipped,
        }
    }

    /// Every violation, chain first, then signatures, workflow and content.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.chain
            .violations
            .iter()
            .chain(&self.signatures.violations)
            .chain(&self.workflow.violations)
            .chain(self.content.iter().flat_map(|c| c.violations.iter()))
    }

    /// Pretty JSON, as emitted for CI.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geas_types::ViolationCode;

    fn passing() -> VerificationReport {
        VerificationReport::new(
            "b",
            ChainValidationResult::new(vec![], 0),
            SignatureValidationResult::new(vec![], 0, 0),
            WorkflowValidationResult::new(vec![], vec![], vec![]),
            None,
        )
    }

    #[test]
    fn skipped_content_does_not_count() {
        let r = passing();
        assert!(r.valid);
        assert_eq!(r.content_status(), ValidationStatus::Skipped);
        assert!(!r.to_json().unwrap().contains("\"content\""));
    }

    #[test]
    fn failing_content_fails_report() {
        let content = ContentValidationResult::new(
            vec![Violation::new(ViolationCode::FileMissing, "gone").at(1)],
            0,
            1,
        );
        let r = VerificationReport::new(
            "b",
            ChainValidationResult::new(vec![], 1),
            SignatureValidationResult::new(vec![], 0, 1),
            WorkflowValidationResult::new(
                vec![Violation::new(ViolationCode::StageMissing, "specs")],
                vec![],
                vec!["specs".into()],
            ),
            Some(content),
        );
        assert!(!r.valid);
        assert_eq!(r.content_status(), ValidationStatus::Fail);
        let codes: Vec<_> = r.violations().map(|v| v.code).collect();
        assert_eq!(codes, vec![ViolationCode::StageMissing, ViolationCode::FileMissing]);
    }

    #[test]
    fn json_report_is_machine_readable() {
        let json = passing().to_json().unwrap();
        let back: VerificationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, passing());
    }
}
