use crate::chain::Ledger;
use crate::error::LedgerResult;
use geas_storage::{read_json, write_json, DocumentIo};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Ledger file name inside a bolt directory.
pub const LOCK_FILE_NAME: &str = "lock.json";

/// Persists a bolt's ledger as `<bolt_dir>/lock.json`.
#[derive(Clone)]
pub struct LedgerStore {
    io: Arc<dyn DocumentIo>,
}

impl LedgerStore {
    pub fn new(io: Arc<dyn DocumentIo>) -> Self {
        Self { io }
    }

    pub fn lock_path(bolt_dir: &Path) -> PathBuf {
        bolt_dir.join(LOCK_FILE_NAME)
    }

    /// `None` when the bolt has no ledger yet.
    pub fn load(&self, bolt_dir: &Path) -> LedgerResult<Option<Ledger>> {
        let path = Self::lock_path(bolt_dir);
        let ledger: Option<Ledger> = read_json(self.io.as_ref(), &path)?;
        if let Some(l) = &ledger {
            tracing::debug!(bolt_id = %l.bolt_id, events = l.len(), "ledger loaded");
        }
        Ok(ledger)
    }

    /// Write the whole ledger back. The store never merges.
    pub fn save(&self, bolt_dir: &Path, ledger: &Ledger) -> LedgerResult<()> {
        write_json(self.io.as_ref(), &Self::lock_path(bolt_dir), ledger)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use chrono::{TimeZone, Utc};
    use geas_storage::{InMemoryFs, LocalFs, StorageError};
    use geas_types::FixedClock;

    #[test]
    fn missing_lock_is_none() {
        let store = LedgerStore::new(Arc::new(InMemoryFs::new()));
        assert!(store.load(Path::new("bolts/a")).unwrap().is_none());
    }

    #[test]
    fn save_then_load_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(Arc::new(LocalFs::new()));
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let ledger = Ledger::genesis("feature-x", &clock);

        store.save(dir.path(), &ledger).unwrap();
        assert!(dir.path().join("lock.json").exists());
        assert_eq!(store.load(dir.path()).unwrap(), Some(ledger));
    }

    #[test]
    fn corrupted_lock_is_structural() {
        let io = Arc::new(InMemoryFs::new());
        io.insert("b/lock.json", r#"{"version":"3.1","bolt_id":"b"}"#);
        let err = LedgerStore::new(io).load(Path::new("b")).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(StorageError::Structural { .. })));
    }

    #[test]
    fn payload_not_matching_action_is_structural() {
        let io = Arc::new(InMemoryFs::new());
        io.insert(
            "b/lock.json",
            r#"{"version":"3.1","bolt_id":"b","created_at":"2025-01-01T00:00:00Z","head_hash":null,
               "events":[{"sequence":1,"timestamp":"2025-01-01T00:00:00Z","action":"APPROVE",
               "payload":{"file":"x","hash":"y"},"prev_hash":null,"identity":null,"event_hash":"sha256:00"}]}"#,
        );
        let err = LedgerStore::new(io).load(Path::new("b")).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(StorageError::Structural { .. })));
    }
}
