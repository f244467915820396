//! # geas-manifest
//!
//! The proof cycle of a bolt: run the test command under a timeout, walk
//! and hash the source scope, fold the hashes into a Merkle root and write
//! the result next to the bolt's MRP.
//!
//! The manifest is referenced by the ledger but never re-validated against
//! the chain; its files are checked by content verification instead.

#![deny(unsafe_code)]

pub mod error;
pub mod manifest;
pub mod merkle;
pub mod prover;
pub mod runner;
pub mod walker;

pub use error::{ManifestError, ManifestResult};
pub use manifest::{Manifest, TestResultInfo, MANIFEST_FILE, TESTS_LOG_FILE};
pub use merkle::merkle_root;
pub use prover::{ProveRequest, Prover, DEFAULT_SCOPE};
pub use runner::{
    run_tests, split_command, CommandOutcome, CommandRunner, ProcessRunner, TIMEOUT_EXIT_CODE,
};
pub use walker::{SourceWalker, DEFAULT_IGNORES};
