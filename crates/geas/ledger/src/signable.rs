//! The bytes a signature covers, per action.
//!
//! - `SEAL_INTENT`: the whole payload
//! - artifact seals: `{action, hash}` only
//! - anything else: the whole payload
//!
//! Sealing and verification both call [`signable_bytes`]; there is no second
//! copy of this mapping.

use crate::error::LedgerResult;
use crate::payload::EventPayload;
use geas_types::LedgerAction;
use serde_json::{json, Value};

/// The document a signer commits to for `action` with `payload`.
pub fn signable_document(action: LedgerAction, payload: &EventPayload) -> LedgerResult<Value> {
    match (action, payload) {
        (action, EventPayload::Artifact(seal)) if action.is_artifact_seal() => Ok(json!({
            "action": action.as_str(),
            "hash": seal.hash,
        })),
        _ => payload.to_value(),
    }
}

/// Canonical encoding of [`signable_document`].
pub fn signable_bytes(action: LedgerAction, payload: &EventPayload) -> LedgerResult<Vec<u8>> {
    let doc = signable_document(action, payload)?;
    Ok(geas_crypto::canonicalize(&doc)?)
}
