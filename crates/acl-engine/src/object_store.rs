//! Object Store: the hierarchy index.
//!
//! Holds `id → {parent, owner}` records. Each call runs in its own
//! transaction and is visible to other callers as soon as it returns.

use crate::hierarchy::{require_object, Ancestors};
use acl_core::{Backend, Error, Object, ObjectId, ReadTxn, Result, Sid, WriteTxn};
use std::sync::Arc;

/// Insert `object` after checking identity, parent, and cycle constraints.
pub(crate) fn insert_object<T: WriteTxn>(txn: &mut T, object: &Object) -> Result<()> {
    object.id.validate("id")?;
    object.owner.validate("owner")?;
    if let Some(parent) = &object.parent {
        parent.validate("parent")?;
        if parent == &object.id {
            return Err(Error::invalid_field(
                "parent",
                format!("object {} cannot be its own parent", object.id),
            ));
        }
    }

    if txn.get_object(&object.id)?.is_some() {
        return Err(Error::conflict("object", object.id.as_str()));
    }
    // Orphans of a deleted object still name it as parent.
    if txn.is_retired(&object.id)? {
        return Err(Error::conflict("retired object id", object.id.as_str()));
    }

    if let Some(parent) = &object.parent {
        require_object(txn, parent).map_err(|e| match e {
            Error::NotFound { id, .. } => Error::not_found("parent object", id),
            other => other,
        })?;
    }

    txn.put_object(object)
}

/// Hierarchy index over a storage backend.
pub struct ObjectStore<B> {
    backend: Arc<B>,
}

impl<B> Clone for ObjectStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: Backend> ObjectStore<B> {
    /// Create a store over `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Register a new object.
    ///
    /// Fails with `Conflict` if `id` exists or belonged to a deleted object,
    /// `NotFound` if `parent` is given but missing, and `InvalidInput` for
    /// malformed identifiers or a self-parent.
    pub fn create(
        &self,
        id: &ObjectId,
        parent: Option<&ObjectId>,
        owner: &Sid,
    ) -> Result<Object> {
        let object = Object {
            id: id.clone(),
            parent: parent.cloned(),
            owner: owner.clone(),
        };
        let mut txn = self.backend.begin_write()?;
        insert_object(&mut txn, &object)?;
        txn.commit()?;
        log::info!(
            "Created object {} (parent: {}, owner: {})",
            object.id,
            object.parent.as_ref().map_or("-", |p| p.as_str()),
            object.owner
        );
        Ok(object)
    }

    /// Fetch an object or fail with `NotFound`.
    pub fn get(&self, id: &ObjectId) -> Result<Object> {
        let txn = self.backend.begin_read()?;
        require_object(&txn, id)
    }

    /// Returns `true` if the object exists.
    pub fn exists(&self, id: &ObjectId) -> Result<bool> {
        let txn = self.backend.begin_read()?;
        Ok(txn.get_object(id)?.is_some())
    }

    /// Ids from `id` up to its root, child first.
    ///
    /// Fails with `BrokenChain` or `CycleDetected` when the stored hierarchy
    /// is corrupt; never loops.
    pub fn ancestor_chain(&self, id: &ObjectId) -> Result<Vec<ObjectId>> {
        let txn = self.backend.begin_read()?;
        let chain = Ancestors::new(&txn, id)
            .map(|step| step.map(|object| object.id))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("Ancestor chain of {id} has {} level(s)", chain.len());
        Ok(chain)
    }

    /// Remove the object record only, retiring its id.
    ///
    /// Grants and descendants are left untouched; use
    /// [`Mutator::delete_object_cascade`](crate::Mutator::delete_object_cascade)
    /// to remove an object together with its grants.
    pub fn delete(&self, id: &ObjectId) -> Result<()> {
        let mut txn = self.backend.begin_write()?;
        if !txn.remove_object(id)? {
            return Err(Error::not_found("object", id.as_str()));
        }
        txn.retire_object(id)?;
        txn.commit()?;
        log::info!("Deleted object record {id}");
        Ok(())
    }
}
