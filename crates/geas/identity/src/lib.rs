//! # geas-identity
//!
//! Who may sign, and with which key.
//!
//! - [`IdentityManager`]: the `identities.yaml` registry (add, lookup,
//!   create, revoke-and-rotate). Stores public keys only.
//! - [`KeyResolver`]: finds the private key for an identity, first in an
//!   injected [`SecretSource`] (`GEAS_KEY_<NAME>`), then in the key directory.
//! - [`KeyVault`]: writes private key files with owner-only permissions.

#![deny(unsafe_code)]

pub mod error;
pub mod keys;
pub mod manager;
pub mod schema;
pub mod vault;

pub use error::{IdentityError, IdentityResult, KeyError};
pub use keys::{secret_variable_name, EnvSecrets, KeyResolver, KeySource, SecretSource, StaticSecrets};
pub use manager::IdentityManager;
pub use schema::{validate_identity_name, Identity, IdentityStore};
pub use vault::{KeySnapshot, KeyVault};
