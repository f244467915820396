use geas_identity::IdentityStore;
use geas_ledger::Ledger;
use geas_types::{Violation, ViolationCode, WorkflowValidationResult};
use geas_workflow::WorkflowConfig;
use std::collections::HashSet;

/// Walk the stages in configured order.
///
/// The latest event for a stage's action completes it. Prerequisites are
/// judged against the stages completed so far in this walk, not against
/// event timestamps. A stage event whose signer role cannot be established
/// (unsigned, or signer unknown) counts as a role violation.
pub fn validate_workflow(
    ledger: &Ledger,
    config: &WorkflowConfig,
    identities: &IdentityStore,
) -> WorkflowValidationResult {
    let mut violations = Vec::new();
    let mut completed: Vec<String> = Vec::new();
    let mut completed_set: HashSet<&str> = HashSet::new();
    let mut missing = Vec::new();

    for stage in &config.stages {
        let Some(event) = ledger.latest(stage.action) else {
            violations.push(Violation::new(
                ViolationCode::StageMissing,
                format!("required stage '{}' ({}) not found in ledger", stage.id, stage.action),
            ));
            missing.push(stage.id.clone());
            continue;
        };

        completed.push(stage.id.clone());
        completed_set.insert(stage.id.as_str());

        let signer = event
            .signer()
            .and_then(|name| identities.get_by_name(name));
        match (event.signer(), signer) {
            (_, Some(identity)) if identity.role == stage.required_role => {}
            (_, Some(identity)) => violations.push(
                Violation::new(
                    ViolationCode::RoleViolation,
                    format!(
                        "stage '{}' requires role {}, signed by {} '{}'",
                        stage.id, stage.required_role, identity.role, identity.name
                    ),
                )
                .at(event.sequence)
                .expected_actual(stage.required_role.as_str(), identity.role.as_str()),
            ),
            (Some(name), None) => violations.push(
                Violation::new(
                    ViolationCode::RoleViolation,
                    format!(
                        "stage '{}' signed by unregistered identity '{name}'; role {} cannot be established",
                        stage.id, stage.required_role
                    ),
                )
                .at(event.sequence),
            ),
            (None, None) => violations.push(
                Violation::new(
                    ViolationCode::RoleViolation,
                    format!("stage '{}' is unsigned; role {} cannot be established", stage.id, stage.required_role),
                )
                .at(event.sequence),
            ),
        }

        if let Some(pre) = &stage.prerequisite {
            if !completed_set.contains(pre.as_str()) {
                violations.push(
                    Violation::new(
                        ViolationCode::PrerequisiteMissing,
                        format!("stage '{}' completed before prerequisite '{pre}'", stage.id),
                    )
                    .at(event.sequence),
                );
            }
        }
    }

    for v in &violations {
        tracing::warn!(bolt_id = %ledger.bolt_id, workflow = %config.name, violation = %v, "workflow violation");
    }
    WorkflowValidationResult::new(violations, completed, missing)
}
