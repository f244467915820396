//! Private key resolution.
//!
//! Resolution order for identity `name`:
//! 1. secret `GEAS_KEY_<NAME>` (uppercased, `-` becomes `_`), holding either
//!    PEM text or base64 of PEM/DER bytes
//! 2. `<key_dir>/<name>.key`
//!
//! Nothing else is consulted.

use crate::error::KeyError;
use crate::vault::KeyVault;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use geas_crypto::PrivateKey;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Prefix of the secret variable consulted before the key directory.
pub const SECRET_PREFIX: &str = "GEAS_KEY_";

/// Where a private key was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeySource {
    Secret { variable: String },
    File { path: PathBuf },
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Secret { variable } => write!(f, "secret {variable}"),
            KeySource::File { path } => write!(f, "file {}", path.display()),
        }
    }
}

/// Named secrets, the environment by default.
pub trait SecretSource: Send + Sync {
    fn get(&self, variable: &str) -> Option<Zeroizing<String>>;
}

/// Reads process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretSource for EnvSecrets {
    fn get(&self, variable: &str) -> Option<Zeroizing<String>> {
        std::env::var(variable).ok().map(Zeroizing::new)
    }
}

/// Fixed secret map for tests and embedding.
#[derive(Default)]
pub struct StaticSecrets(BTreeMap<String, Zeroizing<String>>);

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(variable.into(), Zeroizing::new(value.into()));
        self
    }
}

impl SecretSource for StaticSecrets {
    fn get(&self, variable: &str) -> Option<Zeroizing<String>> {
        self.0.get(variable).cloned()
    }
}

/// `alice-bot` becomes `GEAS_KEY_ALICE_BOT`.
pub fn secret_variable_name(name: &str) -> String {
    format!("{}{}", SECRET_PREFIX, name.to_uppercase().replace('-', "_"))
}

pub(crate) fn reject_path_separators(name: &str) -> Result<(), KeyError> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
        return Err(KeyError::InvalidIdentityName(name.to_string()));
    }
    Ok(())
}

/// Finds the private key for an identity name.
///
/// Lookup order is the `GEAS_KEY_<NAME>` secret, then `<key_dir>/<name>.key`.
/// There is no other fallback.
pub struct KeyResolver {
    secrets: Arc<dyn SecretSource>,
    key_dir: PathBuf,
}

impl KeyResolver {
    pub fn new(secrets: Arc<dyn SecretSource>, key_dir: impl Into<PathBuf>) -> Self {
        Self {
            secrets,
            key_dir: key_dir.into(),
        }
    }

    /// Environment secrets and `~/.geas/keys`.
    pub fn from_env() -> Result<Self, KeyError> {
        Ok(Self::new(Arc::new(EnvSecrets), KeyVault::default_dir()?))
    }

    pub fn key_dir(&self) -> &std::path::Path {
        &self.key_dir
    }

    /// Resolve and parse the private key for `name`.
    ///
    /// Names containing path separators are refused before any lookup. Bytes
    /// that are found but do not parse are [`KeyError::KeyInvalid`], never a
    /// reason to try the next source.
    pub fn resolve(&self, name: &str) -> Result<PrivateKey, KeyError> {
        reject_path_separators(name)?;

        let variable = secret_variable_name(name);
        if let Some(value) = self.secrets.get(&variable).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(identity = name, variable = %variable, "resolving key from secret");
            let origin = KeySource::Secret { variable };
            return parse_secret(&value).map_err(|reason| KeyError::KeyInvalid { origin, reason });
        }

        let path = self.key_dir.join(format!("{name}.key"));
        if path.is_file() {
            tracing::debug!(identity = name, path = %path.display(), "resolving key from file");
            let origin = KeySource::File { path: path.clone() };
            let bytes = std::fs::read(&path).map(Zeroizing::new).map_err(|e| KeyError::KeyInvalid {
                origin: origin.clone(),
                reason: e.to_string(),
            })?;
            return PrivateKey::from_bytes(&bytes).map_err(|e| KeyError::KeyInvalid {
                origin,
                reason: e.to_string(),
            });
        }

        Err(KeyError::KeyNotFound {
            name: name.to_string(),
            variable,
            path,
        })
    }
}

/// Direct PEM first, then base64-wrapped PEM or DER.
fn parse_secret(value: &str) -> Result<PrivateKey, String> {
    let direct = match PrivateKey::from_bytes(value.as_bytes()) {
        Ok(key) => return Ok(key),
        Err(e) => e,
    };
    let decoded = STANDARD
        .decode(value.trim())
        .map(Zeroizing::new)
        .map_err(|e| format!("{direct}; not base64 either: {e}"))?;
    PrivateKey::from_bytes(&decoded).map_err(|e| e.to_string())
}
