//! Property tests for resolution over arbitrary chains.
//!
//! Chains are built as `n0` (root) → `n1` → … → `n{len-1}` (leaf), every
//! level owned by `owner` unless a test says otherwise.

use crate::common::{oid, sid, TestHarness};
use acl_core::{Backend, Permissions};
use acl_storage::MemoryBackend;
use proptest::prelude::*;

fn any_permissions() -> impl Strategy<Value = Permissions> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>())
        .prop_map(|(c, r, u, d)| Permissions::new(c, r, u, d))
}

fn level(i: usize) -> String {
    format!("n{i}")
}

/// Build a chain of `len` levels; `owner_at` names a level owned by `s`.
fn chain(len: usize, owner_at: Option<usize>) -> TestHarness<MemoryBackend> {
    let harness = TestHarness::memory();
    let objects = harness.acl.objects();
    for i in 0..len {
        let owner = if owner_at == Some(i) { "s" } else { "owner" };
        let parent = i.checked_sub(1).map(|p| oid(&level(p)));
        objects
            .create(&oid(&level(i)), parent.as_ref(), &sid(owner))
            .unwrap();
    }
    harness
}

fn leaf_permissions<B: Backend>(harness: &TestHarness<B>, len: usize) -> Permissions {
    harness
        .acl
        .resolver()
        .effective_permissions(&oid(&level(len - 1)), &sid("s"))
        .unwrap()
}

/// (chain length, an index strictly above the leaf)
fn chain_and_ancestor() -> impl Strategy<Value = (usize, usize)> {
    (2usize..12).prop_flat_map(|len| (Just(len), 0..len - 1))
}

/// (chain length, any index, any index)
fn chain_and_two_levels() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..10).prop_flat_map(|len| (Just(len), 0..len, 0..len))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_nearest_ancestor_grant_wins(
        (len, at) in chain_and_ancestor(),
        granted in any_permissions(),
    ) {
        let harness = chain(len, None);
        let mutator = harness.acl.mutator();
        mutator.upsert_single(&oid(&level(at)), &sid("s"), granted).unwrap();
        prop_assert_eq!(leaf_permissions(&harness, len), granted);

        // An explicit all-false row at the leaf shadows the ancestor.
        mutator
            .upsert_single(&oid(&level(len - 1)), &sid("s"), Permissions::NONE)
            .unwrap();
        prop_assert_eq!(leaf_permissions(&harness, len), Permissions::NONE);
    }

    #[test]
    fn test_closer_grant_shadows_farther(
        (len, near) in (3usize..12).prop_flat_map(|len| (Just(len), 1..len)),
        near_flags in any_permissions(),
        far_flags in any_permissions(),
    ) {
        let harness = chain(len, None);
        let mutator = harness.acl.mutator();
        mutator.upsert_single(&oid(&level(0)), &sid("s"), far_flags).unwrap();
        mutator.upsert_single(&oid(&level(near)), &sid("s"), near_flags).unwrap();
        prop_assert_eq!(leaf_permissions(&harness, len), near_flags);
    }

    #[test]
    fn test_owner_and_grant_precedence(
        (len, owner_at, grant_at) in chain_and_two_levels(),
        granted in any_permissions(),
    ) {
        let harness = chain(len, Some(owner_at));
        harness
            .acl
            .mutator()
            .upsert_single(&oid(&level(grant_at)), &sid("s"), granted)
            .unwrap();

        // Same level: the grant row wins. Otherwise the level nearer the leaf.
        let expected = if grant_at >= owner_at { granted } else { Permissions::ALL };
        prop_assert_eq!(leaf_permissions(&harness, len), expected);
    }

    #[test]
    fn test_owner_without_rows_gets_everything(
        (len, owner_at) in (1usize..10).prop_flat_map(|len| (Just(len), 0..len)),
    ) {
        let harness = chain(len, Some(owner_at));
        prop_assert_eq!(leaf_permissions(&harness, len), Permissions::ALL);
    }

    #[test]
    fn test_upsert_idempotent(
        (len, at) in chain_and_ancestor(),
        granted in any_permissions(),
    ) {
        let harness = chain(len, None);
        let mutator = harness.acl.mutator();
        mutator.upsert_single(&oid(&level(at)), &sid("s"), granted).unwrap();
        let once = leaf_permissions(&harness, len);
        mutator.upsert_single(&oid(&level(at)), &sid("s"), granted).unwrap();

        prop_assert_eq!(leaf_permissions(&harness, len), once);
        let rows = harness.acl.grants().list_by_object(&oid(&level(at))).unwrap();
        prop_assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_stranger_is_denied(len in 1usize..10) {
        let harness = chain(len, None);
        prop_assert_eq!(leaf_permissions(&harness, len), Permissions::NONE);
    }
}
