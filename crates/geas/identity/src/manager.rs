use crate::error::{IdentityError, IdentityResult};
use crate::schema::{Identity, IdentityStore};
use crate::vault::KeyVault;
use geas_crypto::{generate_keypair, SecretKeyMaterial};
use geas_storage::{read_yaml, write_yaml, DocumentIo, StorageError};
use geas_types::{Clock, IdentityRole};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reads and writes the identity registry (`identities.yaml`).
///
/// Every mutation is load, modify, save. Private keys go to the [`KeyVault`];
/// only public keys are persisted in the registry.
pub struct IdentityManager {
    io: Arc<dyn DocumentIo>,
    path: PathBuf,
    vault: KeyVault,
    clock: Arc<dyn Clock>,
}

impl IdentityManager {
    pub fn new(
        io: Arc<dyn DocumentIo>,
        path: impl Into<PathBuf>,
        vault: KeyVault,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            io,
            path: path.into(),
            vault,
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn vault(&self) -> &KeyVault {
        &self.vault
    }

    /// Missing file is an empty registry; a malformed one is an error.
    pub fn load(&self) -> IdentityResult<IdentityStore> {
        let store: IdentityStore = read_yaml(self.io.as_ref(), &self.path)?.unwrap_or_default();
        store.validate().map_err(|e| match e {
            IdentityError::Storage(s) => IdentityError::Storage(s),
            other => IdentityError::Storage(StorageError::structural(&self.path, other)),
        })?;
        Ok(store)
    }

    /// Replace the registry document with `store`.
    pub fn save(&self, store: &IdentityStore) -> IdentityResult<()> {
        write_yaml(self.io.as_ref(), &self.path, store)?;
        Ok(())
    }

    /// Load the registry and look up one identity.
    pub fn get_by_name(&self, name: &str) -> IdentityResult<Option<Identity>> {
        Ok(self.load()?.get_by_name(name).cloned())
    }

    /// Validate and append an identity. Names are unique.
    pub fn add(&self, identity: Identity) -> IdentityResult<()> {
        identity.validate()?;
        let mut store = self.load()?;
        if store.get_by_name(&identity.name).is_some() {
            return Err(IdentityError::DuplicateIdentity(identity.name));
        }
        tracing::info!(identity = %identity.name, role = %identity.role, "identity added");
        store.identities.push(identity);
        self.save(&store)
    }

    /// Register a new identity with a freshly generated key. The private half
    /// is installed in the vault and returned; it is not kept anywhere else.
    ///
    /// Either both the registry entry and the key file are written, or
    /// neither is.
    pub fn create(
        &self,
        name: &str,
        role: IdentityRole,
        persona: Option<String>,
        model: Option<String>,
    ) -> IdentityResult<(Identity, SecretKeyMaterial)> {
        let (material, public) = generate_keypair()?;
        let identity = Identity {
            name: name.to_string(),
            role,
            persona,
            model,
            active_key: public.to_string(),
            revoked_keys: Vec::new(),
            created_at: self.clock.now(),
        };
        identity.validate()?;
        if self.get_by_name(name)?.is_some() {
            return Err(IdentityError::DuplicateIdentity(name.to_string()));
        }
        self.install_then(name, &material, || self.add(identity.clone()))?;
        Ok((identity, material))
    }

    /// Retire the active key and issue a new one. If the registry cannot be
    /// saved, the previous key file is put back.
    pub fn revoke_and_rotate(&self, name: &str) -> IdentityResult<SecretKeyMaterial> {
        let mut store = self.load()?;
        let identity = store
            .get_by_name_mut(name)
            .ok_or_else(|| IdentityError::IdentityNotFound(name.to_string()))?;

        let (material, public) = generate_keypair()?;
        let retired = std::mem::replace(&mut identity.active_key, public.to_string());
        identity.revoked_keys.push(retired);

        self.install_then(name, &material, || self.save(&store))?;
        tracing::info!(identity = name, fingerprint = %public.fingerprint(), "key rotated");
        Ok(material)
    }

    /// Install `material` for `name`, then run `commit`. A failure in either
    /// step restores the key file that was there before.
    fn install_then<T>(
        &self,
        name: &str,
        material: &SecretKeyMaterial,
        commit: impl FnOnce() -> IdentityResult<T>,
    ) -> IdentityResult<T> {
        let snapshot = self.vault.snapshot(name)?;
        let outcome = self
            .vault
            .install(name, material)
            .map_err(IdentityError::from)
            .and_then(|_| commit());
        if let Err(err) = &outcome {
            tracing::warn!(identity = name, error = %err, "key installation rolled back");
            if let Err(restore) = self.vault.restore(&snapshot) {
                tracing::error!(
                    identity = name,
                    path = %snapshot.path().display(),
                    error = %restore,
                    "failed to restore previous key file"
                );
            }
        }
        outcome
    }
}
