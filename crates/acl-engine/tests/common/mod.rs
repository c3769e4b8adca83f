//! Common test utilities and harness for ACL engine integration tests.

use acl_core::{Backend, ObjectId, Sid};
use acl_engine::Acl;
use acl_storage::{MemoryBackend, RedbBackend};
use tempfile::TempDir;

/// Test harness owning an engine and whatever keeps its backend alive.
pub struct TestHarness<B> {
    /// Engine under test
    pub acl: Acl<B>,
    _dir: Option<TempDir>,
}

impl TestHarness<MemoryBackend> {
    /// Harness over the copy-on-write memory backend.
    pub fn memory() -> Self {
        Self {
            acl: Acl::new(MemoryBackend::new()),
            _dir: None,
        }
    }
}

impl TestHarness<RedbBackend> {
    /// Harness over a redb database held in memory.
    pub fn redb_in_memory() -> Self {
        Self {
            acl: Acl::new(RedbBackend::in_memory().unwrap()),
            _dir: None,
        }
    }

    /// Harness over a redb database file in a fresh temporary directory.
    pub fn redb_file() -> Self {
        let dir = TempDir::new().unwrap();
        let backend = RedbBackend::open(dir.path().join("acl.redb")).unwrap();
        Self {
            acl: Acl::new(backend),
            _dir: Some(dir),
        }
    }
}

impl<B: Backend> TestHarness<B> {
    /// Create objects from `(id, parent, owner)` triples, in order.
    pub fn tree(&self, nodes: &[(&str, Option<&str>, &str)]) -> &Self {
        let objects = self.acl.objects();
        for (id, parent, owner) in nodes {
            let parent = parent.map(ObjectId::new);
            objects
                .create(&oid(id), parent.as_ref(), &sid(owner))
                .unwrap();
        }
        self
    }
}

/// Shorthand for an object id.
pub fn oid(s: &str) -> ObjectId {
    ObjectId::new(s)
}

/// Shorthand for a sid.
pub fn sid(s: &str) -> Sid {
    Sid::new(s)
}

/// Shorthand for a list of sids.
pub fn sids(names: &[&str]) -> Vec<Sid> {
    names.iter().map(|s| sid(s)).collect()
}

/// Shorthand for a list of object ids.
pub fn oids(names: &[&str]) -> Vec<ObjectId> {
    names.iter().map(|s| oid(s)).collect()
}

/// Generate one `#[test]` per backend for each generic check
/// `fn check<B: Backend>(harness: &TestHarness<B>)` in the calling module.
macro_rules! across_backends {
    ($($check:ident),* $(,)?) => {
        mod memory {
            $(
                #[test]
                fn $check() {
                    super::$check(&$crate::common::TestHarness::memory());
                }
            )*
        }

        mod redb_in_memory {
            $(
                #[test]
                fn $check() {
                    super::$check(&$crate::common::TestHarness::redb_in_memory());
                }
            )*
        }

        mod redb_file {
            $(
                #[test]
                fn $check() {
                    super::$check(&$crate::common::TestHarness::redb_file());
                }
            )*
        }
    };
}
