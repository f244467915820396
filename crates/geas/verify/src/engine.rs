use crate::content::validate_content;
use crate::error::{VerifyError, VerifyResult};
use crate::report::VerificationReport;
use crate::signature::validate_signatures;
use crate::workflow::validate_workflow;
use geas_identity::{IdentityManager, IdentityStore};
use geas_ledger::{verify_chain, Ledger, LedgerStore};
use geas_storage::DocumentIo;
use geas_workflow::{WorkflowConfig, WorkflowLoader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Re-hash sealed files on disk.
    pub check_content: bool,
}

impl VerifyOptions {
    /// Options that also re-hash sealed files.
    pub fn with_content() -> Self {
        Self { check_content: true }
    }
}

/// Run every validator over an in-memory ledger.
///
/// `content` supplies the document store and bolt directory when content
/// checking is wanted; with `None` the content section is skipped.
pub fn verify_ledger(
    ledger: &Ledger,
    identities: &IdentityStore,
    workflow: &WorkflowConfig,
    content: Option<(&dyn DocumentIo, &Path)>,
) -> VerifyResult<VerificationReport> {
    let chain = verify_chain(ledger);
    let signatures = validate_signatures(ledger, identities);
    let flow = validate_workflow(ledger, workflow, identities);
    let content = content
        .map(|(io, bolt_dir)| validate_content(ledger, bolt_dir, io))
        .transpose()?;

    let report = VerificationReport::new(&ledger.bolt_id, chain, signatures, flow, content);
    tracing::info!(
        bolt_id = %report.bolt_id,
        valid = report.valid,
        violations = report.violations().count(),
        "verification finished"
    );
    Ok(report)
}

/// Loads a bolt's ledger, the identity registry and the workflow policy,
/// then verifies.
pub struct Verifier {
    io: Arc<dyn DocumentIo>,
    ledgers: LedgerStore,
    identities: Arc<IdentityManager>,
    workflows: WorkflowLoader,
    workflow_path: PathBuf,
}

impl Verifier {
    pub fn new(
        io: Arc<dyn DocumentIo>,
        identities: Arc<IdentityManager>,
        workflow_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ledgers: LedgerStore::new(io.clone()),
            workflows: WorkflowLoader::new(io.clone()),
            io,
            identities,
            workflow_path: workflow_path.into(),
        }
    }

    /// Load `<bolt_dir>/lock.json`, the registry and the policy, then run the
    /// validator. Only load failures are errors; integrity defects are in the report.
    pub fn verify(&self, bolt_dir: &Path, options: VerifyOptions) -> VerifyResult<VerificationReport> {
        let ledger = self
            .ledgers
            .load(bolt_dir)?
            .ok_or_else(|| VerifyError::LedgerNotFound(LedgerStore::lock_path(bolt_dir)))?;
        self.verify_loaded(&ledger, bolt_dir, options)
    }

    /// Verify a ledger already in memory, reading the registry and policy fresh.
    pub fn verify_loaded(
        &self,
        ledger: &Ledger,
        bolt_dir: &Path,
        options: VerifyOptions,
    ) -> VerifyResult<VerificationReport> {
        let identities = self.identities.load()?;
        let workflow = self.workflows.load(&self.workflow_path)?;
        let content = options
            .check_content
            .then_some((self.io.as_ref(), bolt_dir));
        verify_ledger(ledger, &identities, &workflow, content)
    }
}
