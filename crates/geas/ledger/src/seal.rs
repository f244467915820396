//! Sealing operations: the signed ways events enter a ledger.
//!
//! Every operation verifies the chain first and refuses to extend a ledger
//! that is already inconsistent. Nothing is appended unless signing succeeded.

use crate::chain::{verify_chain, Ledger};
use crate::error::SealError;
use crate::event::{EventDraft, EventIdentity, LedgerEvent};
use crate::payload::{Approval, ArtifactSeal, EventPayload, IntentSeal};
use crate::signable::signable_bytes;
use geas_crypto::{file_digest, sign, PublicKey};
use geas_identity::{IdentityManager, KeyResolver};
use geas_storage::{is_safe_relative, DocumentIo};
use geas_types::{Clock, IdentityRole, LedgerAction};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Documents an intent seal certifies when no workflow says otherwise.
pub const DEFAULT_INTENT_DOCUMENTS: [&str; 3] = ["01_request.md", "02_specs.md", "03_plan.md"];

/// A single-file artifact that can be sealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactTarget {
    Req,
    Specs,
    Plan,
    Mrp,
}

impl ArtifactTarget {
    pub const ALL: [ArtifactTarget; 4] = [
        ArtifactTarget::Req,
        ArtifactTarget::Specs,
        ArtifactTarget::Plan,
        ArtifactTarget::Mrp,
    ];

    /// The name recorded in a seal's `target` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactTarget::Req => "req",
            ArtifactTarget::Specs => "specs",
            ArtifactTarget::Plan => "plan",
            ArtifactTarget::Mrp => "mrp",
        }
    }

    /// Path relative to the bolt directory.
    pub fn file(&self) -> &'static str {
        match self {
            ArtifactTarget::Req => "01_request.md",
            ArtifactTarget::Specs => "02_specs.md",
            ArtifactTarget::Plan => "03_plan.md",
            ArtifactTarget::Mrp => "mrp/summary.md",
        }
    }

    /// The seal action recorded for this target.
    pub fn action(&self) -> LedgerAction {
        match self {
            ArtifactTarget::Req => LedgerAction::SealReq,
            ArtifactTarget::Specs => LedgerAction::SealSpecs,
            ArtifactTarget::Plan => LedgerAction::SealPlan,
            ArtifactTarget::Mrp => LedgerAction::SealMrp,
        }
    }
}

impl fmt::Display for ArtifactTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactTarget {
    type Err = SealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtifactTarget::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SealError::UnknownTarget(s.to_string()))
    }
}

/// Appends signed seal events for one workspace.
pub struct Sealer {
    io: Arc<dyn DocumentIo>,
    identities: Arc<IdentityManager>,
    keys: Arc<KeyResolver>,
    clock: Arc<dyn Clock>,
}

impl Sealer {
    pub fn new(
        io: Arc<dyn DocumentIo>,
        identities: Arc<IdentityManager>,
        keys: Arc<KeyResolver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            io,
            identities,
            keys,
            clock,
        }
    }

    /// Seal one artifact file. Signing is optional for artifact seals.
    pub fn seal_artifact<'l>(
        &self,
        ledger: &'l mut Ledger,
        bolt_dir: &Path,
        target: ArtifactTarget,
        identity: Option<&str>,
        context: Option<&str>,
    ) -> Result<&'l LedgerEvent, SealError> {
        ensure_intact(ledger)?;

        let action = target.action();
        let payload: EventPayload = ArtifactSeal {
            target: Some(target.as_str().to_string()),
            file: target.file().to_string(),
            hash: self.hash_document(bolt_dir, target.file())?,
            context: Some(context.unwrap_or_default().to_string()),
            extra: BTreeMap::new(),
        }
        .into();

        let mut draft = EventDraft::new(self.clock.now(), action, payload);
        if let Some(name) = identity {
            let signer = self.sign_as(name, action, &draft.payload)?;
            draft = draft.signed_by(signer);
        }
        Ok(ledger.append(draft)?)
    }

    /// Certify a set of documents together. Always signed.
    pub fn seal_intent<'l, S: AsRef<str>>(
        &self,
        ledger: &'l mut Ledger,
        bolt_dir: &Path,
        required_documents: &[S],
        identity: &str,
        context: Option<&str>,
    ) -> Result<&'l LedgerEvent, SealError> {
        ensure_intact(ledger)?;

        let mut hashes = BTreeMap::new();
        for doc in required_documents {
            let doc = doc.as_ref();
            hashes.insert(doc.to_string(), self.hash_document(bolt_dir, doc)?);
        }

        let action = LedgerAction::SealIntent;
        let payload: EventPayload = IntentSeal {
            action: Some(action.as_str().to_string()),
            hashes,
            context: Some(context.unwrap_or_default().to_string()),
            extra: BTreeMap::new(),
        }
        .into();
        let signer = self.sign_as(identity, action, &payload)?;
        Ok(ledger.append(EventDraft::new(self.clock.now(), action, payload).signed_by(signer))?)
    }

    /// Approve the most recent sealed MRP. Only human identities may approve.
    pub fn approve<'l>(
        &self,
        ledger: &'l mut Ledger,
        identity: &str,
        comment: Option<&str>,
    ) -> Result<&'l LedgerEvent, SealError> {
        ensure_intact(ledger)?;

        let mrp_event_hash = ledger
            .latest(LedgerAction::SealMrp)
            .map(|e| e.event_hash.clone())
            .ok_or(SealError::MrpNotSealed)?;
        if ledger.latest(LedgerAction::Approve).is_some() {
            tracing::warn!(bolt_id = %ledger.bolt_id, "bolt already carries an approval");
        }

        let registered = self
            .identities
            .get_by_name(identity)?
            .ok_or_else(|| SealError::UnknownIdentity(identity.to_string()))?;
        if registered.role != IdentityRole::Human {
            return Err(SealError::NotHuman {
                name: identity.to_string(),
                role: registered.role.to_string(),
            });
        }

        let action = LedgerAction::Approve;
        let payload: EventPayload = Approval {
            mrp_event_hash,
            comment: Some(comment.unwrap_or_default().to_string()),
            extra: BTreeMap::new(),
        }
        .into();
        let signer = self.sign_as(identity, action, &payload)?;
        Ok(ledger.append(EventDraft::new(self.clock.now(), action, payload).signed_by(signer))?)
    }

    fn hash_document(&self, bolt_dir: &Path, relative: &str) -> Result<String, SealError> {
        if !is_safe_relative(relative) {
            return Err(SealError::UnsafeDocumentPath(relative.to_string()));
        }
        let path = bolt_dir.join(relative);
        if !self.io.exists(&path) {
            return Err(SealError::MissingDocument(path));
        }
        let content = self.io.read(&path)?;
        Ok(file_digest(&content).to_string())
    }

    /// Resolve `name`'s private key, check it against the registry and sign
    /// the projection of `payload` for `action`.
    fn sign_as(
        &self,
        name: &str,
        action: LedgerAction,
        payload: &EventPayload,
    ) -> Result<EventIdentity, SealError> {
        let registered = self
            .identities
            .get_by_name(name)?
            .ok_or_else(|| SealError::UnknownIdentity(name.to_string()))?;
        let key = self.keys.resolve(name)?;

        let matches_registry = PublicKey::parse(&registered.active_key)
            .map(|active| active == key.public_key())
            .unwrap_or(false);
        if !matches_registry {
            return Err(SealError::KeyMismatch(name.to_string()));
        }

        let bytes = signable_bytes(action, payload)?;
        tracing::debug!(identity = name, action = %action, "signing event");
        Ok(EventIdentity {
            signer_id: name.to_string(),
            public_key: registered.active_key,
            signature: sign(&key, &bytes),
        })
    }
}

fn ensure_intact(ledger: &Ledger) -> Result<(), SealError> {
    let check = verify_chain(ledger);
    if check.valid {
        Ok(())
    } else {
        Err(SealError::BrokenChain(check.violations.len()))
    }
}
