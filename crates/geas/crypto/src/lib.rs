//! # geas-crypto
//!
//! Cryptographic primitives for the GEAS ledger: deterministic canonical
//! encoding, SHA-256 digests, and Ed25519 keys and signatures.
//!
//! Canonical bytes are the only thing ever hashed or signed. Stored files are
//! never hashed as "documents"; file content goes through [`file_digest`].
//!
//! Two hashing conventions coexist and must stay separate:
//! - [`file_digest`] hashes raw bytes (seals, content verification, manifests)
//! - [`normalized_text_digest`] trims text before hashing (slug/string inputs)

#![deny(unsafe_code)]

pub mod canonical;
pub mod digest;
pub mod error;
pub mod keys;

pub use canonical::{canonicalize, canonicalize_serializable};
pub use digest::{
    file_digest, normalized_text_digest, sha256_digest, sha256_hex, strip_tag, Digest, HASH_ALGORITHM,
};
pub use error::CryptoError;
pub use keys::{generate_keypair, sign, verify, PrivateKey, PublicKey, SecretKeyMaterial};
