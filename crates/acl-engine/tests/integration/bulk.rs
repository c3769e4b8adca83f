//! Bulk upserts and cascading deletes.

use crate::common::{oid, oids, sid, sids, TestHarness};
use acl_core::{Backend, ErrorKind, Permissions};
use acl_engine::CascadeSummary;

fn forest<B: Backend>(harness: &TestHarness<B>) {
    harness.tree(&[
        ("a", None, "owner"),
        ("b", None, "owner"),
        ("c", None, "owner"),
        ("a1", Some("a"), "owner"),
    ]);
}

fn test_bulk_by_sids_then_resolve<B: Backend>(harness: &TestHarness<B>) {
    forest(harness);
    let written = harness
        .acl
        .mutator()
        .upsert_bulk_by_sids(&oid("a"), &sids(&["s1", "s2", "s3"]), Permissions::read_only())
        .unwrap();
    assert_eq!(written, 3);

    let resolver = harness.acl.resolver();
    for s in ["s1", "s2", "s3"] {
        assert_eq!(
            resolver.effective_permissions(&oid("a1"), &sid(s)).unwrap(),
            Permissions::read_only()
        );
    }
}

fn test_bulk_by_objects_is_atomic<B: Backend>(harness: &TestHarness<B>) {
    forest(harness);
    let err = harness
        .acl
        .mutator()
        .upsert_bulk_by_objects(&sid("g"), &oids(&["a", "b", "zzz"]), Permissions::ALL)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    for id in ["a", "b"] {
        assert!(harness.acl.grants().get(&oid(id), &sid("g")).unwrap().is_none());
    }
}

fn test_bulk_by_objects_same_flags<B: Backend>(harness: &TestHarness<B>) {
    forest(harness);
    let flags = Permissions::new(true, true, true, false);
    harness
        .acl
        .mutator()
        .upsert_bulk_by_objects(&sid("g"), &oids(&["a", "b", "c"]), flags)
        .unwrap();
    for id in ["a", "b", "c"] {
        let row = harness.acl.grants().get(&oid(id), &sid("g")).unwrap();
        assert_eq!(row.unwrap().permissions, flags);
    }
}

fn test_bulk_upsert_idempotent<B: Backend>(harness: &TestHarness<B>) {
    forest(harness);
    let mutator = harness.acl.mutator();
    for _ in 0..3 {
        mutator
            .upsert_bulk_by_sids(&oid("b"), &sids(&["s1", "s2"]), Permissions::ALL)
            .unwrap();
    }
    assert_eq!(harness.acl.grants().list_by_object(&oid("b")).unwrap().len(), 2);
}

fn test_bulk_cascade_atomic_on_missing<B: Backend>(harness: &TestHarness<B>) {
    forest(harness);
    harness
        .acl
        .mutator()
        .upsert_bulk_by_objects(&sid("g"), &oids(&["a", "b"]), Permissions::ALL)
        .unwrap();

    let err = harness
        .acl
        .mutator()
        .delete_objects_cascade_bulk(&oids(&["a", "b", "missing"]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    for id in ["a", "b"] {
        assert!(harness.acl.objects().exists(&oid(id)).unwrap());
        assert_eq!(harness.acl.grants().list_by_object(&oid(id)).unwrap().len(), 1);
    }
}

fn test_bulk_cascade_removes_everything_listed<B: Backend>(harness: &TestHarness<B>) {
    forest(harness);
    let mutator = harness.acl.mutator();
    mutator
        .upsert_bulk_by_sids(&oid("a"), &sids(&["s1", "s2"]), Permissions::ALL)
        .unwrap();
    mutator
        .upsert_single(&oid("b"), &sid("s1"), Permissions::ALL)
        .unwrap();
    mutator
        .upsert_single(&oid("c"), &sid("s1"), Permissions::ALL)
        .unwrap();

    let summary = mutator
        .delete_objects_cascade_bulk(&oids(&["a", "b"]))
        .unwrap();
    assert_eq!(
        summary,
        CascadeSummary {
            objects_removed: 2,
            grants_removed: 3
        }
    );
    assert!(!harness.acl.objects().exists(&oid("a")).unwrap());
    assert!(!harness.acl.objects().exists(&oid("b")).unwrap());
    assert_eq!(harness.acl.grants().list_by_object(&oid("c")).unwrap().len(), 1);
    // The orphaned child survives.
    assert!(harness.acl.objects().exists(&oid("a1")).unwrap());
}

fn test_empty_batches_rejected<B: Backend>(harness: &TestHarness<B>) {
    forest(harness);
    let mutator = harness.acl.mutator();
    let kinds = [
        mutator
            .upsert_bulk_by_sids(&oid("a"), &[], Permissions::ALL)
            .unwrap_err()
            .kind(),
        mutator
            .upsert_bulk_by_objects(&sid("g"), &[], Permissions::ALL)
            .unwrap_err()
            .kind(),
        mutator.delete_objects_cascade_bulk(&[]).unwrap_err().kind(),
        harness.acl.grants().delete_by_objects(&[]).unwrap_err().kind(),
    ];
    assert!(kinds.iter().all(|k| *k == ErrorKind::InvalidInput));
}

across_backends!(
    test_bulk_by_sids_then_resolve,
    test_bulk_by_objects_is_atomic,
    test_bulk_by_objects_same_flags,
    test_bulk_upsert_idempotent,
    test_bulk_cascade_atomic_on_missing,
    test_bulk_cascade_removes_everything_listed,
    test_empty_batches_rejected,
);
