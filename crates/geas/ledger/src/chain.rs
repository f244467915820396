use crate::error::{LedgerError, LedgerResult};
use crate::event::{EventDraft, LedgerEvent};
use chrono::{DateTime, Utc};
use geas_crypto::{canonicalize, sha256_digest, CryptoError};
use geas_types::{ChainValidationResult, Clock, LedgerAction, Violation, ViolationCode};
use serde::{Deserialize, Serialize};

/// Ledger document format version.
pub const LEDGER_VERSION: &str = "3.1";

/// The `lock.json` document of one bolt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub version: String,
    pub bolt_id: String,
    pub created_at: DateTime<Utc>,
    /// Mirrors the last event's `event_hash`; null while empty.
    pub head_hash: Option<String>,
    #[serde(default)]
    pub events: Vec<LedgerEvent>,
}

impl Ledger {
    /// An empty ledger for `bolt_id`, with no head.
    pub fn genesis(bolt_id: impl Into<String>, clock: &dyn Clock) -> Self {
        Self {
            version: LEDGER_VERSION.to_string(),
            bolt_id: bolt_id.into(),
            created_at: clock.now(),
            head_hash: None,
            events: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The newest event, whose hash is the head.
    pub fn last(&self) -> Option<&LedgerEvent> {
        self.events.last()
    }

    /// Most recent event recorded for `action`. Later seals supersede earlier ones.
    pub fn latest(&self, action: LedgerAction) -> Option<&LedgerEvent> {
        self.events.iter().rev().find(|e| e.action == action)
    }

    /// Link, hash and push a new event.
    pub fn append(&mut self, draft: EventDraft) -> LedgerResult<&LedgerEvent> {
        if !draft.payload.fits(draft.action) {
            return Err(LedgerError::PayloadMismatch {
                action: draft.action,
                expected: crate::payload::EventPayload::expected_kind(draft.action),
            });
        }

        let mut event = LedgerEvent {
            sequence: self.events.len() as u64 + 1,
            timestamp: draft.timestamp,
            action: draft.action,
            payload: draft.payload,
            prev_hash: self.head_hash.clone(),
            identity: draft.identity,
            event_hash: String::new(),
        };
        event.event_hash = compute_event_hash(&event)?;

        tracing::info!(
            bolt_id = %self.bolt_id,
            sequence = event.sequence,
            action = %event.action,
            signer = event.signer().unwrap_or("-"),
            "event appended"
        );

        self.head_hash = Some(event.event_hash.clone());
        self.events.push(event);
        Ok(&self.events[self.events.len() - 1])
    }

    /// Recompute every link and hash. Defects are reported, never raised.
    pub fn verify_chain(&self) -> ChainValidationResult {
        verify_chain(self)
    }
}

/// `sha256(canonical(event without event_hash))`, tagged.
pub fn compute_event_hash(event: &LedgerEvent) -> Result<String, CryptoError> {
    let mut doc = serde_json::to_value(event)?;
    if let Some(map) = doc.as_object_mut() {
        map.remove("event_hash");
    }
    Ok(sha256_digest(&canonicalize(&doc)?).to_string())
}

/// Check every chain rule on every event and report all defects found.
///
/// Linkage is compared against the predecessor's stored hash, so editing one
/// event's payload shows up only as that event's `EVENT_TAMPERED`.
pub fn verify_chain(ledger: &Ledger) -> ChainValidationResult {
    let mut violations = Vec::new();

    for (index, event) in ledger.events.iter().enumerate() {
        let expected_sequence = index as u64 + 1;
        if event.sequence != expected_sequence {
            violations.push(
                Violation::new(
                    ViolationCode::SequenceGap,
                    format!("expected sequence {expected_sequence}, found {}", event.sequence),
                )
                .at(event.sequence)
                .expected_actual(expected_sequence, event.sequence),
            );
        }

        let expected_prev = index
            .checked_sub(1)
            .map(|prev| ledger.events[prev].event_hash.as_str());
        if event.prev_hash.as_deref() != expected_prev {
            let message = match expected_prev {
                None => "first event must not reference a previous hash".to_string(),
                Some(_) => "prev_hash does not match the previous event's hash".to_string(),
            };
            violations.push(
                Violation::new(ViolationCode::ChainBroken, message)
                    .at(event.sequence)
                    .expected_actual(expected_prev, event.prev_hash.as_deref()),
            );
        }

        match compute_event_hash(event) {
            Ok(computed) if computed == event.event_hash => {}
            Ok(computed) => violations.push(
                Violation::new(ViolationCode::EventTampered, "event content does not match its hash")
                    .at(event.sequence)
                    .expected_actual(event.event_hash.as_str(), computed),
            ),
            Err(e) => violations.push(
                Violation::new(ViolationCode::EventTampered, format!("event cannot be hashed: {e}"))
                    .at(event.sequence),
            ),
        }
    }

    let last_hash = ledger.events.last().map(|e| e.event_hash.as_str());
    if ledger.head_hash.as_deref() != last_hash {
        violations.push(
            Violation::new(ViolationCode::HeadMismatch, "head_hash does not match the last event")
                .expected_actual(last_hash, ledger.head_hash.as_deref()),
        );
    }

    for v in &violations {
        tracing::warn!(bolt_id = %ledger.bolt_id, violation = %v, "chain violation");
    }
    ChainValidationResult::new(violations, ledger.events.len())
}
