use chrono::{TimeZone, Utc};
use geas_identity::{IdentityManager, KeyResolver, KeyVault, StaticSecrets};
use geas_ledger::{ArtifactTarget, Ledger, LedgerStore, Sealer, DEFAULT_INTENT_DOCUMENTS};
use geas_storage::LocalFs;
use geas_types::{FixedClock, IdentityRole, ValidationStatus, ViolationCode};
use geas_verify::{VerifyError, Verifier, VerifyOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct Workspace {
    root: tempfile::TempDir,
    bolt: PathBuf,
    identities: Arc<IdentityManager>,
    sealer: Sealer,
    store: LedgerStore,
    verifier: Verifier,
    clock: FixedClock,
}

fn workspace() -> Workspace {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let root = tempfile::tempdir().unwrap();
    let geas = root.path().join(".geas");
    let bolt = geas.join("bolts").join("feature-x");
    std::fs::create_dir_all(bolt.join("mrp")).unwrap();

    let io = Arc::new(LocalFs::new());
    let clock = FixedClock(Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap());
    let key_dir = root.path().join("keys");
    let identities = Arc::new(IdentityManager::new(
        io.clone(),
        geas.join("config").join("identities.yaml"),
        KeyVault::new(&key_dir),
        Arc::new(clock),
    ));
    let keys = Arc::new(KeyResolver::new(Arc::new(StaticSecrets::new()), &key_dir));

    Workspace {
        sealer: Sealer::new(io.clone(), identities.clone(), keys, Arc::new(clock)),
        store: LedgerStore::new(io.clone()),
        verifier: Verifier::new(
            io,
            identities.clone(),
            geas.join("config").join("workflow.yaml"),
        ),
        root,
        bolt,
        identities,
        clock,
    }
}

fn write(bolt: &Path, file: &str, content: &str) {
    std::fs::write(bolt.join(file), content).unwrap();
}

/// Seals every standard_dev stage with the right roles and saves the ledger.
fn compliant_bolt(ws: &Workspace) -> Ledger {
    ws.identities.create("lead", IdentityRole::Human, None, None).unwrap();
    ws.identities
        .create("bot", IdentityRole::Agent, Some("Developer".into()), Some("m-1".into()))
        .unwrap();
    for doc in DEFAULT_INTENT_DOCUMENTS {
        write(&ws.bolt, doc, &format!("# {doc}\n"));
    }
    write(&ws.bolt, "mrp/summary.md", "# Summary\n");

    let mut ledger = Ledger::genesis("feature-x", &ws.clock);
    let s = &ws.sealer;
    s.seal_artifact(&mut ledger, &ws.bolt, ArtifactTarget::Req, Some("lead"), None).unwrap();
    s.seal_artifact(&mut ledger, &ws.bolt, ArtifactTarget::Specs, Some("lead"), None).unwrap();
    s.seal_artifact(&mut ledger, &ws.bolt, ArtifactTarget::Plan, Some("bot"), None).unwrap();
    s.seal_intent(&mut ledger, &ws.bolt, &DEFAULT_INTENT_DOCUMENTS, "lead", Some("ready")).unwrap();
    s.seal_artifact(&mut ledger, &ws.bolt, ArtifactTarget::Mrp, Some("bot"), None).unwrap();
    s.approve(&mut ledger, "lead", Some("ship it")).unwrap();
    ws.store.save(&ws.bolt, &ledger).unwrap();
    ledger
}

#[test]
fn compliant_bolt_verifies() {
    let ws = workspace();
    compliant_bolt(&ws);

    let report = ws.verifier.verify(&ws.bolt, VerifyOptions::with_content()).unwrap();
    assert!(report.valid, "{:?}", report.violations().collect::<Vec<_>>());
    assert_eq!(report.bolt_id, "feature-x");
    assert_eq!(report.chain.event_count, 6);
    assert_eq!(report.signatures.verified_count, 6);
    assert_eq!(report.signatures.unsigned_count, 0);
    assert_eq!(report.workflow.completed_stages.len(), 5);
    assert_eq!(report.content_status(), ValidationStatus::Pass);
    // three artifacts, three intent documents, the mrp summary
    assert_eq!(report.content.as_ref().unwrap().checked_files, 7);
}

#[test]
fn rotated_key_revokes_old_signatures_but_not_new_ones() {
    let ws = workspace();
    let mut ledger = compliant_bolt(&ws);
    ws.identities.revoke_and_rotate("lead").unwrap();

    ws.sealer
        .seal_artifact(&mut ledger, &ws.bolt, ArtifactTarget::Req, Some("lead"), Some("after rotation"))
        .unwrap();
    ws.store.save(&ws.bolt, &ledger).unwrap();

    let report = ws.verifier.verify(&ws.bolt, VerifyOptions::default()).unwrap();
    assert!(!report.valid);
    let revoked: Vec<_> = report
        .signatures
        .violations
        .iter()
        .map(|v| (v.code, v.event_sequence))
        .collect();
    assert_eq!(
        revoked,
        vec![
            (ViolationCode::KeyRevoked, Some(1)),
            (ViolationCode::KeyRevoked, Some(2)),
            (ViolationCode::KeyRevoked, Some(4)),
            (ViolationCode::KeyRevoked, Some(6)),
        ]
    );
    // bot's two events plus the re-seal under the new key
    assert_eq!(report.signatures.verified_count, 3);
    assert!(report.chain.valid);
    assert!(report.workflow.valid);
}

#[test]
fn content_tamper_is_caught_only_when_requested() {
    let ws = workspace();
    compliant_bolt(&ws);
    write(&ws.bolt, "02_specs.md", "# Specs, quietly edited\n");

    let without = ws.verifier.verify(&ws.bolt, VerifyOptions::default()).unwrap();
    assert!(without.valid);
    assert_eq!(without.content_status(), ValidationStatus::Skipped);

    let with = ws.verifier.verify(&ws.bolt, VerifyOptions::with_content()).unwrap();
    assert!(!with.valid);
    let content = with.content.as_ref().unwrap();
    // the specs seal and the intent seal both cover 02_specs.md
    assert_eq!(content.modified_files, 2);
    assert!(content
        .violations
        .iter()
        .all(|v| v.code == ViolationCode::FileModified));
}

#[test]
fn hand_edited_lock_file_breaks_chain() {
    let ws = workspace();
    compliant_bolt(&ws);
    let lock = LedgerStore::lock_path(&ws.bolt);
    let text = std::fs::read_to_string(&lock).unwrap();
    std::fs::write(&lock, text.replacen("ship it", "ship it now", 1)).unwrap();

    let report = ws.verifier.verify(&ws.bolt, VerifyOptions::default()).unwrap();
    assert!(!report.valid);
    assert!(report
        .chain
        .violations
        .iter()
        .any(|v| v.code == ViolationCode::EventTampered && v.event_sequence == Some(6)));
    assert!(report
        .signatures
        .violations
        .iter()
        .any(|v| v.code == ViolationCode::InvalidSignature));
}

#[test]
fn missing_ledger_is_an_error() {
    let ws = workspace();
    let err = ws.verifier.verify(&ws.bolt, VerifyOptions::default()).unwrap_err();
    assert!(matches!(err, VerifyError::LedgerNotFound(p) if p.ends_with("lock.json")));
}

#[test]
fn custom_workflow_is_applied() {
    let ws = workspace();
    compliant_bolt(&ws);
    let config_dir = ws.root.path().join(".geas").join("config");
    std::fs::write(
        config_dir.join("workflow.yaml"),
        "name: strict\nversion: \"1\"\nstages:\n  - id: req\n    action: SEAL_REQ\n    required_role: agent\n",
    )
    .unwrap();

    let report = ws.verifier.verify(&ws.bolt, VerifyOptions::default()).unwrap();
    assert!(!report.valid);
    assert_eq!(report.workflow.completed_stages, vec!["req"]);
    assert_eq!(report.workflow.violations[0].code, ViolationCode::RoleViolation);
}

#[test]
fn report_serializes_for_ci() {
    let ws = workspace();
    compliant_bolt(&ws);
    let report = ws.verifier.verify(&ws.bolt, VerifyOptions::default()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["valid"], true);
    assert_eq!(json["chain"]["event_count"], 6);
}

#[test]
fn unsigned_seal_fails_verification() {
    let ws = workspace();
    ws.identities.create("lead", IdentityRole::Human, None, None).unwrap();
    write(&ws.bolt, "01_request.md", "# Request\n");

    let mut ledger = Ledger::genesis("feature-x", &ws.clock);
    ws.sealer
        .seal_artifact(&mut ledger, &ws.bolt, ArtifactTarget::Req, None, None)
        .unwrap();
    ws.sealer
        .seal_artifact(&mut ledger, &ws.bolt, ArtifactTarget::Req, Some("lead"), None)
        .unwrap();
    ws.store.save(&ws.bolt, &ledger).unwrap();

    let report = ws.verifier.verify(&ws.bolt, VerifyOptions::default()).unwrap();
    assert!(!report.valid);
    assert!(report.chain.valid);
    let found: Vec<_> = report
        .signatures
        .violations
        .iter()
        .map(|v| (v.code, v.event_sequence))
        .collect();
    assert_eq!(found, vec![(ViolationCode::IdentityNotFound, Some(1))]);
    assert_eq!(report.signatures.unsigned_count, 1);
    assert_eq!(report.signatures.verified_count, 1);
}
