use crate::error::KeyError;
use crate::keys::reject_path_separators;
use geas_crypto::SecretKeyMaterial;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Directory of `<name>.key` private key files, readable only by the owner.
#[derive(Debug, Clone)]
pub struct KeyVault {
    dir: PathBuf,
}

impl KeyVault {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.geas/keys`
    pub fn default_dir() -> Result<PathBuf, KeyError> {
        dirs::home_dir()
            .map(|home| home.join(".geas").join("keys"))
            .ok_or(KeyError::NoHomeDirectory)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<name>.key`. Names with path separators are refused.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, KeyError> {
        reject_path_separators(name)?;
        Ok(self.dir.join(format!("{name}.key")))
    }

    /// Write (or replace) the key file for `name` with mode 0600.
    pub fn install(&self, name: &str, material: &SecretKeyMaterial) -> Result<PathBuf, KeyError> {
        let path = self.path_for(name)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| KeyError::Io {
            path: self.dir.clone(),
            source,
        })?;
        write_restricted(&path, material.as_bytes())?;
        tracing::info!(identity = name, path = %path.display(), "private key installed");
        Ok(path)
    }

    /// Capture the current key file for `name` so a later install can be undone.
    pub fn snapshot(&self, name: &str) -> Result<KeySnapshot, KeyError> {
        let path = self.path_for(name)?;
        let previous = match std::fs::read(&path) {
            Ok(bytes) => Some(Zeroizing::new(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(source) => return Err(KeyError::Io { path, source }),
        };
        Ok(KeySnapshot { path, previous })
    }

    /// Put the key file back the way `snapshot` found it.
    pub fn restore(&self, snapshot: &KeySnapshot) -> Result<(), KeyError> {
        match &snapshot.previous {
            Some(bytes) => write_restricted(&snapshot.path, bytes),
            None => match std::fs::remove_file(&snapshot.path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(KeyError::Io {
                    path: snapshot.path.clone(),
                    source: e,
                }),
                _ => Ok(()),
            },
        }
    }
}

/// Key file contents as they were before an install. Absent when there was no file.
pub struct KeySnapshot {
    path: PathBuf,
    previous: Option<Zeroizing<Vec<u8>>>,
}

impl KeySnapshot {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a key file was present when the snapshot was taken.
    pub fn existed(&self) -> bool {
        self.previous.is_some()
    }
}

impl std::fmt::Debug for KeySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySnapshot")
            .field("path", &self.path)
            .field("existed", &self.existed())
            .finish()
    }
}

fn write_restricted(path: &Path, bytes: &[u8]) -> Result<(), KeyError> {
    let io_err = |source: std::io::Error| KeyError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(io_err)?;
    file.write_all(bytes).map_err(io_err)?;
    file.flush().map_err(io_err)?;

    // An existing file keeps its old mode through open(); tighten it.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(io_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geas_crypto::{generate_keypair, PrivateKey};

    #[test]
    fn install_writes_parseable_key() {
        let dir = tempfile::tempdir().unwrap();
        let vault = KeyVault::new(dir.path().join("keys"));
        let (material, public) = generate_keypair().unwrap();

        let path = vault.install("alice", &material).unwrap();
        assert_eq!(path, dir.path().join("keys").join("alice.key"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(PrivateKey::from_bytes(&bytes).unwrap().public_key(), public);
    }

    #[cfg(unix)]
    #[test]
    fn key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let vault = KeyVault::new(dir.path());
        std::fs::write(dir.path().join("bob.key"), b"old").unwrap();
        std::fs::set_permissions(dir.path().join("bob.key"), std::fs::Permissions::from_mode(0o644))
            .unwrap();

        let (material, _) = generate_keypair().unwrap();
        let path = vault.install("bob", &material).unwrap();
        let mode = std::fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn traversal_rejected() {
        let vault = KeyVault::new("/tmp/unused");
        assert!(matches!(vault.path_for("../x"), Err(KeyError::InvalidIdentityName(_))));
    }

    #[test]
    fn restore_puts_back_previous_key() {
        let dir = tempfile::tempdir().unwrap();
        let vault = KeyVault::new(dir.path());
        let (old, _) = generate_keypair().unwrap();
        let (new, _) = generate_keypair().unwrap();
        let path = vault.install("carol", &old).unwrap();

        let snapshot = vault.snapshot("carol").unwrap();
        assert!(snapshot.existed());
        vault.install("carol", &new).unwrap();
        vault.restore(&snapshot).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), old.as_bytes());
    }

    #[test]
    fn restore_removes_key_that_did_not_exist() {
        let dir = tempfile::tempdir().unwrap();
        let vault = KeyVault::new(dir.path());
        let snapshot = vault.snapshot("dave").unwrap();
        assert!(!snapshot.existed());

        let (material, _) = generate_keypair().unwrap();
        let path = vault.install("dave", &material).unwrap();
        vault.restore(&snapshot).unwrap();
        assert!(!path.exists());
        vault.restore(&snapshot).unwrap();
    }
}
