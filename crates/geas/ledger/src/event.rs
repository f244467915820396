use crate::error::LedgerError;
use crate::payload::EventPayload;
use chrono::{DateTime, Utc};
use geas_types::LedgerAction;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Signer block copied into an event at signing time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventIdentity {
    /// Registered identity name.
    pub signer_id: String,
    /// OpenSSH public key text used for this signature.
    pub public_key: String,
    /// Base64 Ed25519 signature over the signable projection.
    pub signature: String,
}

/// One immutable ledger entry.
///
/// `sequence`, `prev_hash` and `event_hash` are assigned by
/// [`Ledger::append`](crate::Ledger::append); callers supply an [`EventDraft`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLedgerEvent")]
pub struct LedgerEvent {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub action: LedgerAction,
    pub payload: EventPayload,
    pub prev_hash: Option<String>,
    pub identity: Option<EventIdentity>,
    pub event_hash: String,
}

/// Wire form; the payload is decoded once the action is known.
#[derive(Deserialize)]
struct RawLedgerEvent {
    sequence: u64,
    timestamp: DateTime<Utc>,
    action: LedgerAction,
    payload: Value,
    #[serde(default)]
    prev_hash: Option<String>,
    #[serde(default)]
    identity: Option<EventIdentity>,
    event_hash: String,
}

impl TryFrom<RawLedgerEvent> for LedgerEvent {
    type Error = LedgerError;

    fn try_from(raw: RawLedgerEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            sequence: raw.sequence,
            timestamp: raw.timestamp,
            action: raw.action,
            payload: EventPayload::from_value(raw.action, raw.payload)?,
            prev_hash: raw.prev_hash,
            identity: raw.identity,
            event_hash: raw.event_hash,
        })
    }
}

impl LedgerEvent {
    /// Name of the signing identity, if the event is signed.
    pub fn signer(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.signer_id.as_str())
    }
}

/// What a caller provides to append an event.
#[derive(Clone, Debug, PartialEq)]
pub struct EventDraft {
    pub timestamp: DateTime<Utc>,
    pub action: LedgerAction,
    pub payload: EventPayload,
    pub identity: Option<EventIdentity>,
}

impl EventDraft {
    /// An unsigned draft. Sequence and hashes are assigned by [`Ledger::append`](crate::Ledger::append).
    pub fn new(timestamp: DateTime<Utc>, action: LedgerAction, payload: impl Into<EventPayload>) -> Self {
        Self {
            timestamp,
            action,
            payload: payload.into(),
            identity: None,
        }
    }

    pub fn signed_by(mut self, identity: EventIdentity) -> Self {
        self.identity = Some(identity);
        self
    }
}
