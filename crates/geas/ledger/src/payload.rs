//! Typed event payloads, one shape per kind of action.
//!
//! Each shape keeps unrecognized fields in `extra` so a payload written by a
//! newer producer hashes and verifies identically after a round trip.

use crate::error::{LedgerError, LedgerResult};
use geas_types::LedgerAction;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Payload of `SEAL_REQ`, `SEAL_SPECS`, `SEAL_PLAN` and `SEAL_MRP`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSeal {
    /// Short target name (`req`, `specs`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Path of the sealed file relative to the bolt directory.
    pub file: String,
    /// Raw content digest, `sha256:<hex>`.
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Payload of `SEAL_INTENT`: several documents certified together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentSeal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Document path to raw content digest.
    pub hashes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Payload of `APPROVE`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    /// `event_hash` of the SEAL_MRP event being approved.
    pub mrp_event_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    Artifact(ArtifactSeal),
    Intent(IntentSeal),
    Approval(Approval),
}

impl EventPayload {
    /// Name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::Artifact(_) => "artifact",
            EventPayload::Intent(_) => "intent",
            EventPayload::Approval(_) => "approval",
        }
    }

    /// The variant an action requires.
    pub fn expected_kind(action: LedgerAction) -> &'static str {
        match action {
            LedgerAction::SealIntent => "intent",
            LedgerAction::Approve => "approval",
            _ => "artifact",
        }
    }

    /// Whether this payload shape belongs to `action`.
    pub fn fits(&self, action: LedgerAction) -> bool {
        self.kind() == Self::expected_kind(action)
    }

    /// Decode a raw payload using its action to pick the shape.
    pub fn from_value(action: LedgerAction, value: Value) -> LedgerResult<Self> {
        let malformed = |e: serde_json::Error| LedgerError::MalformedPayload {
            action,
            message: e.to_string(),
        };
        let payload = match action {
            LedgerAction::SealIntent => EventPayload::Intent(serde_json::from_value(value).map_err(malformed)?),
            LedgerAction::Approve => EventPayload::Approval(serde_json::from_value(value).map_err(malformed)?),
            _ => EventPayload::Artifact(serde_json::from_value(value).map_err(malformed)?),
        };
        Ok(payload)
    }

    /// The payload as a JSON object, unknown fields included.
    pub fn to_value(&self) -> LedgerResult<Value> {
        Ok(serde_json::to_value(self).map_err(geas_crypto::CryptoError::from)?)
    }

    /// Fields this version does not model, kept so they re-hash identically.
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        match self {
            EventPayload::Artifact(p) => &p.extra,
            EventPayload::Intent(p) => &p.extra,
            EventPayload::Approval(p) => &p.extra,
        }
    }

    /// A generic `files` map (path to digest) carried alongside the typed
    /// fields. Entries whose value is not a string are ignored.
    pub fn extra_files(&self) -> Option<BTreeMap<String, String>> {
        let files: &Map<String, Value> = self.extra().get("files")?.as_object()?;
        Some(
            files
                .iter()
                .filter_map(|(path, hash)| hash.as_str().map(|h| (path.clone(), h.to_string())))
                .collect(),
        )
    }

    pub fn as_artifact(&self) -> Option<&ArtifactSeal> {
        match self {
            EventPayload::Artifact(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_intent(&self) -> Option<&IntentSeal> {
        match self {
            EventPayload::Intent(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_approval(&self) -> Option<&Approval> {
        match self {
            EventPayload::Approval(p) => Some(p),
            _ => None,
        }
    }
}

impl From<ArtifactSeal> for EventPayload {
    fn from(p: ArtifactSeal) -> Self {
        EventPayload::Artifact(p)
    }
}

impl From<IntentSeal> for EventPayload {
    fn from(p: IntentSeal) -> Self {
        EventPayload::Intent(p)
    }
}

impl From<Approval> for EventPayload {
    fn from(p: Approval) -> Self {
        EventPayload::Approval(p)
    }
}
