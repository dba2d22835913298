//! PatternStore behavior: idempotent merge, overlap lookup, tier ranges,
//! atomic supersession, persistence, and the audit trail.

use std::sync::Arc;

use chrono::Utc;

use autonomic_core::config::EquivalenceMode;
use autonomic_core::pattern::CanonicalEquivalence;
use autonomic_core::errors::{AutonomicError, StorageError};
use autonomic_core::traits::IPatternStore;
use autonomic_core::{
    Confidence, Pattern, PatternId, PatternStatus, RejectionReason, StructuralDescription,
};
use autonomic_storage::audit::AuditOperation;
use autonomic_storage::pool::pragmas::verify_wal_mode;
use autonomic_storage::StorageEngine;

fn store() -> StorageEngine {
    StorageEngine::open_in_memory(Arc::new(CanonicalEquivalence::default())).unwrap()
}

fn co(pairs: &[(&str, &str)]) -> StructuralDescription {
    StructuralDescription::co_occurrence(pairs.iter().map(|(k, v)| (*k, *v)))
}

fn candidate(desc: StructuralDescription, tier: u32, evidence: u64, provenance: &[&str]) -> Pattern {
    Pattern::candidate(
        desc,
        tier,
        Confidence::from_evidence(evidence, 1.0),
        evidence,
        provenance.iter().map(|s| s.to_string()).collect(),
        Utc::now(),
    )
    .unwrap()
}

fn accepted(desc: StructuralDescription, tier: u32, evidence: u64, provenance: &[&str]) -> Pattern {
    let mut p = candidate(desc, tier, evidence, provenance);
    p.status = PatternStatus::Accepted;
    p
}

#[test]
fn get_missing_is_none() {
    let s = store();
    assert!(s.get(&PatternId::from("nope")).unwrap().is_none());
}

#[test]
fn put_twice_reinforces_one_record() {
    let s = store();
    let p = candidate(co(&[("event", "login_failure")]), 0, 2, &["c1", "c2"]);
    s.put(&p).unwrap();
    let again = candidate(co(&[("event", "login_failure")]), 0, 1, &["c3"]);
    let stored = s.put(&again).unwrap();

    assert_eq!(stored.id, p.id);
    assert_eq!(stored.evidence_count, 3);
    assert_eq!(stored.provenance, vec!["c1", "c2", "c3"]);
    assert_eq!(s.stats().unwrap().total(), 1);

    let fetched = s.get(&p.id).unwrap().unwrap();
    assert_eq!(fetched, stored);
}

#[test]
fn description_roundtrips_through_storage() {
    let s = store();
    let transition = StructuralDescription::Transition {
        key: "state".into(),
        from: "open".into(),
        to: "locked".into(),
    };
    let mut p = candidate(transition, 0, 2, &["a", "b"]);
    p.status = PatternStatus::Rejected;
    p.rejection_reason = Some(RejectionReason::LowConfidence {
        confidence: 0.4,
        threshold: 0.5,
    });
    s.put(&p).unwrap();
    let back = s.get(&p.id).unwrap().unwrap();
    assert_eq!(back.description, p.description);
    assert_eq!(back.rejection_reason, p.rejection_reason);
    assert_eq!(back.status, PatternStatus::Rejected);
}

#[test]
fn find_overlapping_matches_equivalent_descriptions_only() {
    let s = store();
    let login = accepted(co(&[("event", "login_failure")]), 0, 3, &["a", "b", "c"]);
    let other = accepted(co(&[("event", "logout")]), 0, 2, &["a", "b"]);
    s.put(&login).unwrap();
    s.put(&other).unwrap();

    let hits = s.find_overlapping(&co(&[("event", "login_failure")])).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, login.id);

    assert!(s
        .find_overlapping(&co(&[("event", "password_reset")]))
        .unwrap()
        .is_empty());
}

#[test]
fn normalized_equivalence_finds_differently_spelled_bodies() {
    let s = StorageEngine::open_in_memory(Arc::new(CanonicalEquivalence::new(
        EquivalenceMode::Normalized,
        false,
    )))
    .unwrap();
    let p = accepted(co(&[("event", "login_failure")]), 0, 3, &["a", "b", "c"]);
    s.put(&p).unwrap();

    let hits = s.find_overlapping(&co(&[("event", "LOGIN_FAILURE")])).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, p.id);
}

#[test]
fn list_accepted_respects_tier_range_and_status() {
    let s = store();
    let base = accepted(co(&[("a", "1")]), 0, 2, &["x", "y"]);
    let pending = candidate(co(&[("b", "2")]), 0, 2, &["x", "y"]);
    let tier1 = accepted(
        StructuralDescription::composite([base.id.clone(), PatternId::from("zz")]),
        1,
        2,
        &[base.id.as_str(), "zz"],
    );
    let tier2 = accepted(
        StructuralDescription::composite([tier1.id.clone(), PatternId::from("yy")]),
        2,
        2,
        &[tier1.id.as_str(), "yy"],
    );
    for p in [&base, &pending, &tier1, &tier2] {
        s.put(p).unwrap();
    }

    let all = s.list_accepted(0, 16).unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| w[0].tier <= w[1].tier));

    let low = s.list_accepted(0, 1).unwrap();
    assert_eq!(low.iter().map(|p| p.tier).collect::<Vec<_>>(), vec![0, 1]);

    assert!(s.list_accepted(3, 1).unwrap().is_empty());
}

#[test]
fn accept_superseding_marks_prior_pattern() {
    let s = store();
    let old = accepted(co(&[("event", "login_failure")]), 0, 2, &["a", "b"]);
    s.put(&old).unwrap();
    let new = candidate(co(&[("event", "login_failure"), ("source", "vpn")]), 0, 4, &["c", "d", "e", "f"]);

    let stored = s.accept_superseding(&new, &[old.id.clone()]).unwrap();
    assert_eq!(stored.status, PatternStatus::Accepted);

    let old_now = s.get(&old.id).unwrap().unwrap();
    assert_eq!(old_now.status, PatternStatus::Superseded);
    assert_eq!(old_now.superseded_by.as_ref(), Some(&new.id));

    let stats = s.stats().unwrap();
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.superseded, 1);
}

#[test]
fn superseded_is_terminal() {
    let s = store();
    let old = accepted(co(&[("k", "v")]), 0, 2, &["a", "b"]);
    s.put(&old).unwrap();
    let new = candidate(co(&[("k", "w")]), 0, 3, &["c", "d", "e"]);
    s.accept_superseding(&new, &[old.id.clone()]).unwrap();

    // A later accepted write of the old body does not revive it.
    let revival = accepted(co(&[("k", "v")]), 0, 5, &["f"]);
    let stored = s.put(&revival).unwrap();
    assert_eq!(stored.status, PatternStatus::Superseded);
    assert_eq!(stored.evidence_count, 7);
    assert!(s.list_accepted(0, 0).unwrap().iter().all(|p| p.id != old.id));
}

#[test]
fn persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patterns.db");
    let p = accepted(co(&[("event", "login_failure")]), 0, 3, &["a", "b", "c"]);
    {
        let s = StorageEngine::open(&path, Arc::new(CanonicalEquivalence::default())).unwrap();
        s.put(&p).unwrap();
        assert!(s.pool().with_writer(verify_wal_mode).unwrap());
        assert_eq!(s.pool().reader_count(), 4);
        assert_eq!(s.pool().db_path(), Some(path.as_path()));
    }
    let s = StorageEngine::open(&path, Arc::new(CanonicalEquivalence::default())).unwrap();
    let back = s.get(&p.id).unwrap().unwrap();
    assert_eq!(back.evidence_count, 3);
    assert_eq!(back.status, PatternStatus::Accepted);
    assert_eq!(s.schema_version().unwrap(), autonomic_storage::migrations::LATEST_VERSION);
}

#[test]
fn audit_trail_records_every_write() {
    let s = store();
    let p = candidate(co(&[("event", "login_failure")]), 0, 2, &["a", "b"]);
    s.put(&p).unwrap();
    let mut verdict = candidate(co(&[("event", "login_failure")]), 0, 1, &["c"]);
    verdict.status = PatternStatus::Accepted;
    s.put(&verdict).unwrap();

    let ops: Vec<AuditOperation> = s
        .audit_trail(&p.id)
        .unwrap()
        .into_iter()
        .map(|e| e.operation)
        .collect();
    assert_eq!(
        ops,
        vec![
            AuditOperation::Created,
            AuditOperation::Reinforced,
            AuditOperation::Accepted
        ]
    );
}

#[test]
fn unreadable_row_is_reported_as_store_failure() {
    let s = store();
    let p = candidate(co(&[("event", "disk_full")]), 0, 2, &["c1", "c2"]);
    s.put(&p).unwrap();
    s.pool()
        .with_writer(|conn| {
            conn.execute(
                "UPDATE patterns SET status = 'archived' WHERE id = ?1",
                [p.id.as_str()],
            )
            .unwrap();
            Ok(())
        })
        .unwrap();

    let err = s.get(&p.id).unwrap_err();
    assert!(err.is_store_unavailable());
    assert!(matches!(
        err,
        AutonomicError::StoreUnavailable(StorageError::CorruptRecord { field: "status", .. })
    ));
}

#[test]
fn unproposed_lists_accepted_records_until_marked() {
    let s = store();
    let strong = accepted(co(&[("event", "oom_kill")]), 0, 9, &["a"]);
    let weak = accepted(co(&[("event", "slow_disk")]), 0, 2, &["b"]);
    let pending = candidate(co(&[("event", "cpu_spike")]), 0, 9, &["c"]);
    for p in [&strong, &weak, &pending] {
        s.put(p).unwrap();
    }

    let eligible = s.list_unproposed(0.8, 3).unwrap();
    assert_eq!(eligible.iter().map(|p| &p.id).collect::<Vec<_>>(), vec![&strong.id]);

    assert_eq!(s.mark_proposed(&[strong.id.clone()], Utc::now()).unwrap(), 1);
    assert_eq!(s.mark_proposed(&[strong.id.clone()], Utc::now()).unwrap(), 0);
    assert!(s.list_unproposed(0.8, 3).unwrap().is_empty());
    assert_eq!(
        s.audit_trail(&strong.id).unwrap().last().map(|e| e.operation),
        Some(AuditOperation::Proposed)
    );

    // Reinforcement past the thresholds makes the weak record eligible.
    s.put(&candidate(co(&[("event", "slow_disk")]), 0, 8, &["d"])).unwrap();
    let eligible = s.list_unproposed(0.8, 3).unwrap();
    assert_eq!(eligible.iter().map(|p| &p.id).collect::<Vec<_>>(), vec![&weak.id]);
}

#[test]
fn reopening_with_another_equivalence_rebuilds_lookup_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patterns.db");
    let p = accepted(co(&[("event", "Login_Failure")]), 0, 3, &["a"]);
    {
        let s = StorageEngine::open(&path, Arc::new(CanonicalEquivalence::default())).unwrap();
        s.put(&p).unwrap();
        assert!(s.find_overlapping(&co(&[("event", "login_failure")])).unwrap().is_empty());
    }
    let normalized = Arc::new(CanonicalEquivalence::new(EquivalenceMode::Normalized, false));
    let s = StorageEngine::open(&path, normalized).unwrap();
    let found = s.find_overlapping(&co(&[("event", "login_failure")])).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, p.id);
}

#[test]
fn containment_overlap_still_finds_wider_bodies() {
    let s = StorageEngine::open_in_memory(Arc::new(CanonicalEquivalence::new(
        EquivalenceMode::Exact,
        true,
    )))
    .unwrap();
    let wide = accepted(co(&[("event", "login_failure"), ("region", "eu")]), 0, 3, &["a"]);
    s.put(&wide).unwrap();
    let found = s.find_overlapping(&co(&[("event", "login_failure")])).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, wide.id);
}
