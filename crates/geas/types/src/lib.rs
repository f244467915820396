//! Shared vocabulary for the GEAS governance ledger.
//!
//! Every other GEAS crate speaks in these types:
//! - [`LedgerAction`]: the closed set of sealing actions a ledger may record
//! - [`IdentityRole`]: who is allowed to perform a governance stage
//! - [`Violation`] / [`ViolationCode`]: integrity defects as values, never errors
//! - validation result shapes shared by the chain, signature, workflow and
//!   content validators
//! - [`Clock`]: injected time source, so no crate reads the wall clock directly

#![deny(unsafe_code)]

pub mod action;
pub mod clock;
pub mod role;
pub mod validation;
pub mod violation;

pub use action::{LedgerAction, UnknownAction};
pub use clock::{Clock, FixedClock, SystemClock};
pub use role::{IdentityRole, UnknownRole};
pub use validation::{
    ChainValidationResult, ContentValidationResult, SignatureValidationResult, ValidationStatus,
    WorkflowValidationResult,
};
pub use violation::{Violation, ViolationCode};
