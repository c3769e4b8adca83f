//! Concurrent writers and readers sharing one engine.

use crate::common::{oid, sid, TestHarness};
use acl_core::{Backend, Permissions, ReadTxn};
use std::thread;

const THREADS: usize = 6;
const ROUNDS: usize = 25;

fn test_concurrent_upserts_last_commit_wins<B: Backend + 'static>(harness: &TestHarness<B>) {
    harness.tree(&[("shared", None, "owner")]);
    let candidates = [
        Permissions::ALL,
        Permissions::NONE,
        Permissions::read_only(),
        Permissions::new(true, false, true, false),
    ];

    thread::scope(|scope| {
        for t in 0..THREADS {
            let mutator = harness.acl.mutator();
            scope.spawn(move || {
                for round in 0..ROUNDS {
                    let flags = candidates[(t + round) % candidates.len()];
                    mutator
                        .upsert_single(&oid("shared"), &sid("s"), flags)
                        .unwrap();
                }
            });
        }
        for _ in 0..2 {
            let resolver = harness.acl.resolver();
            scope.spawn(move || {
                for _ in 0..ROUNDS {
                    let seen = resolver
                        .effective_permissions(&oid("shared"), &sid("s"))
                        .unwrap();
                    // Either no row yet (default deny) or exactly one whole row.
                    assert!(seen == Permissions::NONE || candidates.contains(&seen));
                }
            });
        }
    });

    let rows = harness.acl.grants().list_by_object(&oid("shared")).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(candidates.contains(&rows[0].permissions));
}

fn test_bulk_writes_never_torn<B: Backend + 'static>(harness: &TestHarness<B>) {
    harness.tree(&[("o", None, "owner")]);
    let members = crate::common::sids(&["m1", "m2", "m3", "m4"]);

    thread::scope(|scope| {
        for t in 0..THREADS {
            let mutator = harness.acl.mutator();
            let members = &members;
            scope.spawn(move || {
                let flags = if t % 2 == 0 {
                    Permissions::ALL
                } else {
                    Permissions::read_only()
                };
                for _ in 0..ROUNDS {
                    mutator.upsert_bulk_by_sids(&oid("o"), members, flags).unwrap();
                }
            });
        }
        let backend = harness.acl.backend();
        scope.spawn(move || {
            for _ in 0..ROUNDS {
                let txn = backend.begin_read().unwrap();
                let rows = txn.grants_for_object(&oid("o")).unwrap();
                // A batch is visible in full or not at all.
                if let Some(first) = rows.first() {
                    assert_eq!(rows.len(), 4);
                    assert!(rows.iter().all(|g| g.permissions == first.permissions));
                }
            }
        });
    });
}

fn test_cascade_racing_upserts_leaves_no_stray_grants<B: Backend + 'static>(
    harness: &TestHarness<B>,
) {
    harness.tree(&[("victim", None, "owner")]);

    thread::scope(|scope| {
        for t in 0..THREADS {
            let mutator = harness.acl.mutator();
            scope.spawn(move || {
                for round in 0..ROUNDS {
                    let who = sid(&format!("s{t}-{round}"));
                    // NotFound once the cascade has won; any other error is a bug.
                    if let Err(e) = mutator.upsert_single(&oid("victim"), &who, Permissions::ALL) {
                        assert_eq!(e.kind(), acl_core::ErrorKind::NotFound);
                    }
                }
            });
        }
        let mutator = harness.acl.mutator();
        scope.spawn(move || {
            mutator.delete_object_cascade(&oid("victim")).unwrap();
        });
    });

    assert!(!harness.acl.objects().exists(&oid("victim")).unwrap());
    assert!(harness
        .acl
        .grants()
        .list_by_object(&oid("victim"))
        .unwrap()
        .is_empty());
}

across_backends!(
    test_concurrent_upserts_last_commit_wins,
    test_bulk_writes_never_torn,
    test_cascade_racing_upserts_leaves_no_stray_grants,
);
