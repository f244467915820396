//! # geas-verify
//!
//! Independent re-derivation of everything a ledger claims.
//!
//! | validator | checks |
//! |-----------|--------|
//! | [`validate_chain`] | sequence, linkage, event hashes, head |
//! | [`validate_signatures`] | signer registered, key active and not revoked, signature over the signable projection |
//! | [`validate_workflow`] | every stage present, signed by the required role, prerequisites complete in configured order |
//! | [`validate_content`] | sealed files still hash to what was sealed (opt-in) |
//!
//! Validators never fail on integrity defects; those come back as
//! [`Violation`](geas_types::Violation)s. Only I/O that prevents reading an
//! input is an error. [`Verifier`] runs them all and aggregates a
//! [`VerificationReport`].

#![deny(unsafe_code)]

pub mod content;
pub mod engine;
pub mod error;
pub mod report;
pub mod signature;
pub mod workflow;

pub use content::validate_content;
pub use engine::{verify_ledger, Verifier, VerifyOptions};
pub use error::{VerifyError, VerifyResult};
pub use geas_ledger::verify_chain as validate_chain;
pub use report::VerificationReport;
pub use signature::validate_signatures;
pub use workflow::validate_workflow;
