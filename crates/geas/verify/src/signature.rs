use geas_identity::IdentityStore;
use geas_ledger::{signable_bytes, Ledger, LedgerEvent};
use geas_types::{SignatureValidationResult, Violation, ViolationCode};

/// Check every signed event against the identity registry.
///
/// Per event the first failing check wins: unknown signer, revoked key, key
/// other than the active one, then the signature itself. An event without an
/// identity block cannot be attributed to anyone, so it is counted in
/// `unsigned_count` and reported as `IDENTITY_NOT_FOUND`.
pub fn validate_signatures(ledger: &Ledger, identities: &IdentityStore) -> SignatureValidationResult {
    let mut violations = Vec::new();
    let mut verified = 0;
    let mut unsigned = 0;

    for event in &ledger.events {
        if event.identity.is_none() {
            unsigned += 1;
            let v = Violation::new(
                ViolationCode::IdentityNotFound,
                format!("event {} carries no identity information", event.sequence),
            )
            .at(event.sequence);
            tracing::warn!(bolt_id = %ledger.bolt_id, violation = %v, "signature violation");
            violations.push(v);
            continue;
        }
        match check_event(event, identities) {
            None => verified += 1,
            Some(v) => {
                tracing::warn!(bolt_id = %ledger.bolt_id, violation = %v, "signature violation");
                violations.push(v);
            }
        }
    }

    SignatureValidationResult::new(violations, verified, unsigned)
}

fn check_event(event: &LedgerEvent, identities: &IdentityStore) -> Option<Violation> {
    let signer = event.identity.as_ref()?;
    let seq = event.sequence;

    let Some(registered) = identities.get_by_name(&signer.signer_id) else {
        return Some(
            Violation::new(
                ViolationCode::IdentityNotFound,
                format!("identity '{}' is not registered", signer.signer_id),
            )
            .at(seq),
        );
    };

    if registered.is_revoked(&signer.public_key) {
        return Some(
            Violation::new(
                ViolationCode::KeyRevoked,
                format!("event signed with a revoked key of '{}'", signer.signer_id),
            )
            .at(seq),
        );
    }

    if !registered.is_active(&signer.public_key) {
        return Some(
            Violation::new(
                ViolationCode::KeyMismatch,
                format!("key does not match the active key of '{}'", signer.signer_id),
            )
            .at(seq)
            .expected_actual(registered.active_key.as_str(), signer.public_key.as_str()),
        );
    }

    let bytes = match signable_bytes(event.action, &event.payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            return Some(
                Violation::new(ViolationCode::InvalidSignature, format!("cannot rebuild signed bytes: {e}"))
                    .at(seq),
            )
        }
    };
    if geas_crypto::verify(&signer.public_key, &signer.signature, &bytes) {
        tracing::debug!(sequence = seq, signer = %signer.signer_id, "signature verified");
        None
    } else {
        Some(
            Violation::new(
                ViolationCode::InvalidSignature,
                format!("signature by '{}' does not verify", signer.signer_id),
            )
            .at(seq),
        )
    }
}
