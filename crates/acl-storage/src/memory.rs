//! In-memory backend with copy-on-write snapshots.
//!
//! Readers clone an `Arc` to the last committed [`Snapshot`] and never wait.
//! The writer holds a mutex for the lifetime of its transaction, works on a
//! private copy, and swaps it in on commit. Dropping the writer discards the
//! copy.
//!
//! Every write transaction copies the whole state, which is fine for tests and
//! small embedded uses.

use acl_core::{
    Backend, Error, Grant, Object, ObjectId, Permissions, ReadTxn, Result, Sid, WriteTxn,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

#[derive(Debug, Clone, Default)]
struct Snapshot {
    objects: BTreeMap<ObjectId, Object>,
    grants: BTreeMap<(ObjectId, Sid), Permissions>,
    retired: BTreeSet<ObjectId>,
}

impl Snapshot {
    fn get_object(&self, id: &ObjectId) -> Option<Object> {
        self.objects.get(id).cloned()
    }

    fn get_grant(&self, object_id: &ObjectId, sid: &Sid) -> Option<Permissions> {
        self.grants.get(&(object_id.clone(), sid.clone())).copied()
    }

    fn grants_for_object(&self, object_id: &ObjectId) -> Vec<Grant> {
        self.grants
            .range((object_id.clone(), Sid::new(""))..)
            .take_while(|((oid, _), _)| oid == object_id)
            .map(|((oid, sid), perms)| Grant::new(oid.clone(), sid.clone(), *perms))
            .collect()
    }

    fn is_retired(&self, id: &ObjectId) -> bool {
        self.retired.contains(id)
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::storage("memory backend lock poisoned")
}

// ============================================================================
// MemoryBackend
// ============================================================================

/// ACL storage held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    committed: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
}

impl MemoryBackend {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects in the last committed state.
    pub fn object_count(&self) -> Result<usize> {
        Ok(self.committed.read().map_err(poisoned)?.objects.len())
    }

    /// Number of stored grants in the last committed state.
    pub fn grant_count(&self) -> Result<usize> {
        Ok(self.committed.read().map_err(poisoned)?.grants.len())
    }
}

impl Backend for MemoryBackend {
    type Read<'a>
        = MemoryRead
    where
        Self: 'a;
    type Write<'a>
        = MemoryWrite<'a>
    where
        Self: 'a;

    fn name(&self) -> &'static str {
        "memory"
    }

    fn begin_read(&self) -> Result<MemoryRead> {
        let snapshot = Arc::clone(&*self.committed.read().map_err(poisoned)?);
        Ok(MemoryRead { snapshot })
    }

    fn begin_write(&self) -> Result<MemoryWrite<'_>> {
        let guard = self.writer.lock().map_err(poisoned)?;
        let working = Snapshot::clone(&**self.committed.read().map_err(poisoned)?);
        Ok(MemoryWrite {
            _guard: guard,
            committed: &self.committed,
            working,
        })
    }
}

// ============================================================================
// Transactions
// ============================================================================

/// Read snapshot of a [`MemoryBackend`].
#[derive(Debug)]
pub struct MemoryRead {
    snapshot: Arc<Snapshot>,
}

impl ReadTxn for MemoryRead {
    fn get_object(&self, id: &ObjectId) -> Result<Option<Object>> {
        Ok(self.snapshot.get_object(id))
    }

    fn get_grant(&self, object_id: &ObjectId, sid: &Sid) -> Result<Option<Permissions>> {
        Ok(self.snapshot.get_grant(object_id, sid))
    }

    fn grants_for_object(&self, object_id: &ObjectId) -> Result<Vec<Grant>> {
        Ok(self.snapshot.grants_for_object(object_id))
    }

    fn is_retired(&self, id: &ObjectId) -> Result<bool> {
        Ok(self.snapshot.is_retired(id))
    }
}

/// The single live write transaction of a [`MemoryBackend`].
#[derive(Debug)]
pub struct MemoryWrite<'a> {
    _guard: MutexGuard<'a, ()>,
    committed: &'a RwLock<Arc<Snapshot>>,
    working: Snapshot,
}

impl ReadTxn for MemoryWrite<'_> {
    fn get_object(&self, id: &ObjectId) -> Result<Option<Object>> {
        Ok(self.working.get_object(id))
    }

    fn get_grant(&self, object_id: &ObjectId, sid: &Sid) -> Result<Option<Permissions>> {
        Ok(self.working.get_grant(object_id, sid))
    }

    fn grants_for_object(&self, object_id: &ObjectId) -> Result<Vec<Grant>> {
        Ok(self.working.grants_for_object(object_id))
    }

    fn is_retired(&self, id: &ObjectId) -> Result<bool> {
        Ok(self.working.is_retired(id))
    }
}

impl WriteTxn for MemoryWrite<'_> {
    fn put_object(&mut self, object: &Object) -> Result<()> {
        self.working
            .objects
            .insert(object.id.clone(), object.clone());
        Ok(())
    }

    fn remove_object(&mut self, id: &ObjectId) -> Result<bool> {
        Ok(self.working.objects.remove(id).is_some())
    }

    fn retire_object(&mut self, id: &ObjectId) -> Result<()> {
        self.working.retired.insert(id.clone());
        Ok(())
    }

    fn put_grant(&mut self, grant: &Grant) -> Result<()> {
        self.working.grants.insert(
            (grant.object_id.clone(), grant.sid.clone()),
            grant.permissions,
        );
        Ok(())
    }

    fn remove_grants_for_object(&mut self, object_id: &ObjectId) -> Result<usize> {
        let before = self.working.grants.len();
        self.working.grants.retain(|(oid, _), _| oid != object_id);
        Ok(before - self.working.grants.len())
    }

    fn commit(self) -> Result<()> {
        let mut committed = self.committed.write().map_err(poisoned)?;
        *committed = Arc::new(self.working);
        Ok(())
    }
}
