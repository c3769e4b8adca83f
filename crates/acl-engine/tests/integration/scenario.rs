//! End-to-end resolution scenarios.

use crate::common::{oid, sid, TestHarness};
use acl_core::{Backend, ErrorKind, Permission, Permissions};
use acl_engine::ResolutionSource;

/// root `r` (owner u1) with child `c` (owner u2), u3 granted read on `c`.
fn seed<B: Backend>(harness: &TestHarness<B>) {
    harness.tree(&[("r", None, "u1"), ("c", Some("r"), "u2")]);
    harness
        .acl
        .mutator()
        .upsert_single(&oid("c"), &sid("u3"), Permissions::read_only())
        .unwrap();
}

fn test_end_to_end_resolution<B: Backend>(harness: &TestHarness<B>) {
    seed(harness);
    let resolver = harness.acl.resolver();

    assert_eq!(
        resolver.effective_permissions(&oid("c"), &sid("u3")).unwrap(),
        Permissions::new(false, true, false, false)
    );
    assert_eq!(
        resolver.effective_permissions(&oid("c"), &sid("u1")).unwrap(),
        Permissions::ALL
    );
    assert_eq!(
        resolver.effective_permissions(&oid("r"), &sid("u3")).unwrap(),
        Permissions::NONE
    );
    assert_eq!(
        resolver.effective_permissions(&oid("c"), &sid("u2")).unwrap(),
        Permissions::ALL
    );
}

fn test_explain_sources<B: Backend>(harness: &TestHarness<B>) {
    seed(harness);
    let resolver = harness.acl.resolver();

    let direct = resolver.resolve(&oid("c"), &sid("u3")).unwrap();
    assert_eq!(direct.source, ResolutionSource::Direct { object_id: oid("c") });
    assert_eq!(direct.depth, 1);

    let inherited_owner = resolver.resolve(&oid("c"), &sid("u1")).unwrap();
    assert_eq!(
        inherited_owner.source,
        ResolutionSource::Owner { object_id: oid("r") }
    );
    assert_eq!(inherited_owner.depth, 2);

    let nothing = resolver.resolve(&oid("c"), &sid("stranger")).unwrap();
    assert_eq!(nothing.source, ResolutionSource::Default);
}

fn test_explicit_deny_overrides_owner<B: Backend>(harness: &TestHarness<B>) {
    seed(harness);
    harness
        .acl
        .mutator()
        .upsert_single(&oid("c"), &sid("u2"), Permissions::NONE)
        .unwrap();
    let resolver = harness.acl.resolver();
    assert!(!resolver.check(&oid("c"), &sid("u2"), Permission::Read).unwrap());
    // The root's owner is unaffected below.
    assert!(resolver.check(&oid("c"), &sid("u1"), Permission::Delete).unwrap());
}

fn test_revoking_restores_inheritance<B: Backend>(harness: &TestHarness<B>) {
    seed(harness);
    let mutator = harness.acl.mutator();
    mutator
        .upsert_single(&oid("r"), &sid("u4"), Permissions::ALL)
        .unwrap();
    mutator
        .upsert_single(&oid("c"), &sid("u4"), Permissions::NONE)
        .unwrap();
    let resolver = harness.acl.resolver();
    assert_eq!(
        resolver.effective_permissions(&oid("c"), &sid("u4")).unwrap(),
        Permissions::NONE
    );

    harness.acl.grants().delete_by_object(&oid("c")).unwrap();
    assert_eq!(
        resolver.effective_permissions(&oid("c"), &sid("u4")).unwrap(),
        Permissions::ALL
    );
}

fn test_cascade_breaks_descendant_walks<B: Backend>(harness: &TestHarness<B>) {
    seed(harness);
    harness.tree(&[("leaf", Some("c"), "u5")]);
    harness.acl.mutator().delete_object_cascade(&oid("c")).unwrap();

    let resolver = harness.acl.resolver();
    // The leaf decides at its own level without reaching the gap.
    assert_eq!(
        resolver.effective_permissions(&oid("leaf"), &sid("u5")).unwrap(),
        Permissions::ALL
    );
    let err = resolver.resolve(&oid("leaf"), &sid("u1")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BrokenChain);
    assert!(err.is_consistency_error());

    let err = harness.acl.objects().ancestor_chain(&oid("leaf")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BrokenChain);
}

fn test_deleted_id_cannot_be_reclaimed<B: Backend>(harness: &TestHarness<B>) {
    harness.tree(&[("r", None, "alice"), ("c", Some("r"), "bob")]);
    harness.acl.mutator().delete_object_cascade(&oid("r")).unwrap();
    harness.tree(&[("elsewhere", None, "mallory")]);

    let objects = harness.acl.objects();
    for parent in [None, Some(oid("elsewhere"))] {
        let err = objects
            .create(&oid("r"), parent.as_ref(), &sid("mallory"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    let err = harness
        .acl
        .resolver()
        .resolve(&oid("c"), &sid("mallory"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BrokenChain);
}

fn test_create_rules<B: Backend>(harness: &TestHarness<B>) {
    seed(harness);
    let objects = harness.acl.objects();

    let err = objects.create(&oid("c"), None, &sid("u9")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = objects
        .create(&oid("x"), Some(&oid("ghost")), &sid("u9"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = objects
        .create(&oid("r"), Some(&oid("c")), &sid("u9"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    assert_eq!(
        objects.ancestor_chain(&oid("c")).unwrap(),
        vec![oid("c"), oid("r")]
    );
}

across_backends!(
    test_end_to_end_resolution,
    test_explain_sources,
    test_explicit_deny_overrides_owner,
    test_revoking_restores_inheritance,
    test_cascade_breaks_descendant_walks,
    test_deleted_id_cannot_be_reclaimed,
    test_create_rules,
);
