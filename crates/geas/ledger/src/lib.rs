//! # geas-ledger
//!
//! The append-only, hash-chained record of sealing actions for one unit of
//! work ("bolt").
//!
//! ## Chain rules
//!
//! - sequences run `1..=N` without gaps
//! - every event's `prev_hash` is the stored `event_hash` of its predecessor
//!   (null for the first)
//! - `event_hash = sha256(canonical(event without event_hash))`
//! - the ledger's `head_hash` is the last event's `event_hash`
//!
//! [`Ledger::append`] is the only way to add an event and maintains all four.
//! [`verify_chain`] checks them independently and reports every defect.
//!
//! ## Signing
//!
//! What a signature covers depends on the action; [`signable_document`] is the
//! single definition used both when sealing and when verifying.

#![deny(unsafe_code)]

pub mod chain;
pub mod error;
pub mod event;
pub mod payload;
pub mod seal;
pub mod signable;
pub mod store;

pub use chain::{compute_event_hash, verify_chain, Ledger, LEDGER_VERSION};
pub use error::{LedgerError, LedgerResult, SealError};
pub use event::{EventDraft, EventIdentity, LedgerEvent};
pub use payload::{Approval, ArtifactSeal, EventPayload, IntentSeal};
pub use seal::{ArtifactTarget, Sealer, DEFAULT_INTENT_DOCUMENTS};
pub use signable::{signable_bytes, signable_document};
pub use store::{LedgerStore, LOCK_FILE_NAME};
