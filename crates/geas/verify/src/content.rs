use crate::error::VerifyResult;
use geas_crypto::file_digest;
use geas_ledger::{EventPayload, Ledger, LedgerEvent};
use geas_storage::{is_safe_relative, DocumentIo};
use geas_types::{ContentValidationResult, Violation, ViolationCode};
use std::path::Path;

/// Re-hash every file the ledger sealed, relative to `bolt_dir`.
///
/// Covers intent hash maps, single-file artifact seals, and any generic
/// `files` map carried by an event. Always the raw whole-file digest.
/// Missing files are violations, and so are paths that would leave
/// `bolt_dir`; those are never read. Any other read failure is an error.
pub fn validate_content(
    ledger: &Ledger,
    bolt_dir: &Path,
    io: &dyn DocumentIo,
) -> VerifyResult<ContentValidationResult> {
    let mut check = ContentCheck {
        io,
        bolt_dir,
        violations: Vec::new(),
        checked: 0,
        modified: 0,
    };

    for event in &ledger.events {
        match &event.payload {
            EventPayload::Intent(intent) => {
                for (file, hash) in &intent.hashes {
                    check.file(event, file, hash)?;
                }
            }
            EventPayload::Artifact(seal) if event.action.is_artifact_seal() => {
                check.file(event, &seal.file, &seal.hash)?;
            }
            _ => {}
        }
        if let Some(files) = event.payload.extra_files() {
            for (file, hash) in &files {
                check.file(event, file, hash)?;
            }
        }
    }

    Ok(ContentValidationResult::new(check.violations, check.checked, check.modified))
}

struct ContentCheck<'a> {
    io: &'a dyn DocumentIo,
    bolt_dir: &'a Path,
    violations: Vec<Violation>,
    checked: usize,
    /// Missing plus changed.
    modified: usize,
}

impl ContentCheck<'_> {
    fn file(&mut self, event: &LedgerEvent, relative: &str, sealed: &str) -> VerifyResult<()> {
        if !is_safe_relative(relative) {
            tracing::warn!(sequence = event.sequence, file = relative, "sealed path escapes bolt directory");
            self.modified += 1;
            self.violations.push(
                Violation::new(
                    ViolationCode::FileMissing,
                    format!("sealed path '{relative}' escapes the bolt directory"),
                )
                .at(event.sequence),
            );
            return Ok(());
        }

        let path = self.bolt_dir.join(relative);
        if !self.io.exists(&path) {
            tracing::warn!(sequence = event.sequence, file = relative, "sealed file missing");
            self.modified += 1;
            self.violations.push(
                Violation::new(ViolationCode::FileMissing, format!("sealed file '{relative}' is missing"))
                    .at(event.sequence),
            );
            return Ok(());
        }

        let current = file_digest(&self.io.read(&path)?).to_string();
        self.checked += 1;
        if current != sealed {
            tracing::warn!(sequence = event.sequence, file = relative, "sealed file modified");
            self.modified += 1;
            self.violations.push(
                Violation::new(ViolationCode::FileModified, format!("file '{relative}' has been modified"))
                    .at(event.sequence)
                    .expected_actual(sealed, current),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use geas_ledger::{ArtifactSeal, EventDraft, IntentSeal};
    use geas_storage::{InMemoryFs, LocalFs};
    use geas_types::{FixedClock, LedgerAction};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 8, 8, 8, 8, 8).unwrap())
    }

    fn digest(s: &str) -> String {
        file_digest(s.as_bytes()).to_string()
    }

    fn artifact(file: &str, content: &str) -> EventDraft {
        EventDraft::new(
            clock().0,
            LedgerAction::SealReq,
            ArtifactSeal {
                target: None,
                file: file.into(),
                hash: digest(content),
                context: None,
                extra: BTreeMap::new(),
            },
        )
    }

    fn codes(r: &ContentValidationResult) -> Vec<ViolationCode> {
        r.violations.iter().map(|v| v.code).collect()
    }

    #[test]
    fn untouched_files_pass() {
        let fs = InMemoryFs::new();
        fs.insert("bolt/01_request.md", "req");
        let mut ledger = Ledger::genesis("b", &clock());
        ledger.append(artifact("01_request.md", "req")).unwrap();

        let r = validate_content(&ledger, Path::new("bolt"), &fs).unwrap();
        assert!(r.valid);
        assert_eq!((r.checked_files, r.modified_files), (1, 0));
    }

    #[test]
    fn modified_and_missing() {
        let fs = InMemoryFs::new();
        fs.insert("bolt/01_request.md", "req v2");
        let mut hashes = BTreeMap::new();
        hashes.insert("02_specs.md".to_string(), digest("specs"));
        let mut ledger = Ledger::genesis("b", &clock());
        ledger.append(artifact("01_request.md", "req")).unwrap();
        ledger
            .append(EventDraft::new(
                clock().0,
                LedgerAction::SealIntent,
                IntentSeal {
                    action: None,
                    hashes,
                    context: None,
                    extra: BTreeMap::new(),
                },
            ))
            .unwrap();

        let r = validate_content(&ledger, Path::new("bolt"), &fs).unwrap();
        assert_eq!(codes(&r), vec![ViolationCode::FileModified, ViolationCode::FileMissing]);
        assert_eq!((r.checked_files, r.modified_files), (1, 2));
        assert_eq!(r.violations[1].event_sequence, Some(2));
    }

    #[test]
    fn whitespace_only_change_is_still_a_modification() {
        let fs = InMemoryFs::new();
        fs.insert("bolt/01_request.md", "req\n");
        let mut ledger = Ledger::genesis("b", &clock());
        ledger.append(artifact("01_request.md", "req")).unwrap();
        let r = validate_content(&ledger, Path::new("bolt"), &fs).unwrap();
        assert_eq!(codes(&r), vec![ViolationCode::FileModified]);
    }

    #[test]
    fn generic_files_map_is_checked() {
        let fs = InMemoryFs::new();
        fs.insert("bolt/mrp/summary.md", "mrp");
        fs.insert("bolt/src/lib.rs", "changed");
        let mut extra = BTreeMap::new();
        extra.insert("files".to_string(), json!({"src/lib.rs": digest("original")}));
        let mut ledger = Ledger::genesis("b", &clock());
        ledger
            .append(EventDraft::new(
                clock().0,
                LedgerAction::SealMrp,
                ArtifactSeal {
                    target: Some("mrp".into()),
                    file: "mrp/summary.md".into(),
                    hash: digest("mrp"),
                    context: None,
                    extra,
                },
            ))
            .unwrap();

        let r = validate_content(&ledger, Path::new("bolt"), &fs).unwrap();
        assert_eq!(codes(&r), vec![ViolationCode::FileModified]);
        assert_eq!(r.checked_files, 2);
    }

    #[test]
    fn escaping_paths_are_never_read() {
        let fs = InMemoryFs::new();
        fs.insert("secret.md", "outside");
        fs.insert("/etc/geas.md", "outside");
        let mut ledger = Ledger::genesis("b", &clock());
        ledger.append(artifact("../secret.md", "outside")).unwrap();
        ledger.append(artifact("/etc/geas.md", "outside")).unwrap();

        let r = validate_content(&ledger, Path::new("bolt"), &fs).unwrap();
        assert_eq!(codes(&r), vec![ViolationCode::FileMissing, ViolationCode::FileMissing]);
        assert_eq!((r.checked_files, r.modified_files), (0, 2));
        assert!(r.violations[0].message.contains("escapes the bolt directory"));
        assert_eq!(r.violations[1].event_sequence, Some(2));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // a directory named like the sealed file exists but cannot be read as one
        std::fs::create_dir_all(dir.path().join("01_request.md").join("inner")).unwrap();
        let mut ledger = Ledger::genesis("b", &clock());
        ledger.append(artifact("01_request.md", "req")).unwrap();

        struct Always;
        impl DocumentIo for Always {
            fn exists(&self, _: &Path) -> bool {
                true
            }
            fn read(&self, path: &Path) -> geas_storage::StorageResult<Vec<u8>> {
                LocalFs.read(path)
            }
            fn write(&self, _: &Path, _: &[u8]) -> geas_storage::StorageResult<()> {
                Ok(())
            }
        }
        assert!(validate_content(&ledger, dir.path(), &Always).is_err());
    }
}
