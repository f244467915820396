use crate::merkle::merkle_root;
use chrono::{DateTime, Utc};
use geas_types::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Manifest location inside a bolt directory.
pub const MANIFEST_FILE: &str = "mrp/manifest.json";
/// Test log location inside a bolt directory.
pub const TESTS_LOG_FILE: &str = "mrp/tests.log";

/// Outcome of one test-command run, bound into the manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResultInfo {
    pub passed: bool,
    pub exit_code: i32,
    /// Killed at the deadline. `exit_code` is then a placeholder.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub timed_out: bool,
    pub duration_seconds: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub output: String,
}

impl TestResultInfo {
    /// Placeholder recorded when tests were deliberately not run.
    pub fn skipped(at: DateTime<Utc>) -> Self {
        Self {
            passed: true,
            exit_code: 0,
            timed_out: false,
            duration_seconds: 0.0,
            timestamp: at,
            output: String::new(),
        }
    }

    /// Human-readable log written next to the manifest.
    pub fn render_log(&self, command: &str) -> String {
        format!(
            "Test Execution Log\nTimestamp: {}\nCommand: {command}\nPassed: {}\nExit Code: {}\nDuration: {:.3}s\n{}\n{}",
            self.timestamp.to_rfc3339(),
            self.passed,
            self.exit_code,
            self.duration_seconds,
            "-".repeat(40),
            self.output,
        )
    }
}

/// Fingerprint of a source tree bound to a test outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub bolt_id: String,
    pub generated_at: DateTime<Utc>,
    pub scope: Vec<String>,
    /// Relative path to tagged content hash.
    pub files: BTreeMap<String, String>,
    /// Bare hex.
    pub root_hash: String,
    pub test_result: TestResultInfo,
}

impl Manifest {
    /// Compute the Merkle root of `files` and stamp the manifest with `clock`.
    pub fn build(
        bolt_id: impl Into<String>,
        scope: Vec<String>,
        files: BTreeMap<String, String>,
        test_result: TestResultInfo,
        clock: &dyn Clock,
    ) -> Self {
        let root_hash = merkle_root(&files);
        Self {
            bolt_id: bolt_id.into(),
            generated_at: clock.now(),
            scope,
            files,
            root_hash,
            test_result,
        }
    }

    /// Whether `root_hash` still matches `files`.
    pub fn root_matches(&self) -> bool {
        merkle_root(&self.files) == self.root_hash
    }
}
