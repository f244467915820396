use crate::error::{ManifestError, ManifestResult};
use crate::manifest::{Manifest, TestResultInfo, MANIFEST_FILE, TESTS_LOG_FILE};
use crate::runner::{run_tests, CommandRunner};
use crate::walker::SourceWalker;
use geas_crypto::file_digest;
use geas_ledger::Ledger;
use geas_storage::{write_json, DocumentIo};
use geas_types::{Clock, LedgerAction};
use geas_workflow::WorkflowConfig;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Directories hashed when no scope is given.
pub const DEFAULT_SCOPE: [&str; 2] = ["src", "tests"];

/// Parameters of one proof run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProveRequest {
    pub scope: Vec<String>,
    pub skip_tests: bool,
    pub command: String,
    pub timeout: Duration,
}

impl ProveRequest {
    /// Test command and timeout from the workspace policy, default scope.
    pub fn from_workflow(config: &WorkflowConfig) -> Self {
        Self {
            scope: DEFAULT_SCOPE.iter().map(|s| s.to_string()).collect(),
            skip_tests: false,
            command: config.test_command.clone(),
            timeout: config.test_timeout(),
        }
    }

    /// Comma-separated scope, blanks dropped.
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = scope
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// Record a passing placeholder instead of running the test command.
    pub fn skipping_tests(mut self) -> Self {
        self.skip_tests = true;
        self
    }
}

/// Generates a bolt's code manifest and test log.
pub struct Prover {
    io: Arc<dyn DocumentIo>,
    runner: Arc<dyn CommandRunner>,
    clock: Arc<dyn Clock>,
}

impl Prover {
    pub fn new(io: Arc<dyn DocumentIo>, runner: Arc<dyn CommandRunner>, clock: Arc<dyn Clock>) -> Self {
        Self { io, runner, clock }
    }

    /// Run tests, hash the scope under `root` and write the manifest and
    /// test log into `bolt_dir`. Nothing is written unless tests passed or
    /// were skipped.
    pub async fn prove(
        &self,
        ledger: &Ledger,
        root: &Path,
        bolt_dir: &Path,
        request: &ProveRequest,
    ) -> ManifestResult<Manifest> {
        if ledger.latest(LedgerAction::SealIntent).is_none() {
            return Err(ManifestError::IntentNotSealed(ledger.bolt_id.clone()));
        }

        let test_result = if request.skip_tests {
            tracing::warn!(bolt_id = %ledger.bolt_id, "skipping tests");
            TestResultInfo::skipped(self.clock.now())
        } else {
            let result = run_tests(
                self.runner.as_ref(),
                &request.command,
                root,
                request.timeout,
                self.clock.as_ref(),
            )
            .await;
            if result.timed_out {
                tracing::warn!(bolt_id = %ledger.bolt_id, timeout_secs = request.timeout.as_secs(), "tests timed out, no proof generated");
                return Err(ManifestError::TestsTimedOut {
                    seconds: request.timeout.as_secs(),
                    result: Box::new(result),
                });
            }
            if !result.passed {
                tracing::warn!(bolt_id = %ledger.bolt_id, exit_code = result.exit_code, "tests failed, no proof generated");
                return Err(ManifestError::TestsFailed(Box::new(result)));
            }
            result
        };

        let paths = SourceWalker::new(root).walk(&request.scope)?;
        if paths.is_empty() {
            return Err(ManifestError::EmptyScope(request.scope.clone()));
        }
        let mut files = BTreeMap::new();
        for rel in paths {
            let content = self.io.read(&root.join(&rel))?;
            files.insert(rel, file_digest(&content).to_string());
        }

        let manifest = Manifest::build(
            ledger.bolt_id.clone(),
            request.scope.clone(),
            files,
            test_result,
            self.clock.as_ref(),
        );
        write_json(self.io.as_ref(), &bolt_dir.join(MANIFEST_FILE), &manifest)?;
        self.io.write(
            &bolt_dir.join(TESTS_LOG_FILE),
            manifest.test_result.render_log(&request.command).as_bytes(),
        )?;

        tracing::info!(
            bolt_id = %manifest.bolt_id,
            files = manifest.files.len(),
            root_hash = %manifest.root_hash,
            "proof generated"
        );
        Ok(manifest)
    }
}
