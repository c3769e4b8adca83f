//! Grant Store: direct grants keyed by `(object_id, sid)`.

use crate::hierarchy::require_object;
use crate::unique_ids;
use acl_core::{Backend, Grant, ObjectId, ReadTxn, Result, Sid, WriteTxn};
use std::sync::Arc;

/// Direct grant rows over a storage backend.
///
/// Rows are replaced whole on upsert; flags are never merged.
pub struct GrantStore<B> {
    backend: Arc<B>,
}

impl<B> Clone for GrantStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: Backend> GrantStore<B> {
    /// Create a store over `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Insert or fully replace the row for `(grant.object_id, grant.sid)`.
    ///
    /// The object must exist, so a grant can never point at a missing
    /// object.
    pub fn upsert(&self, grant: &Grant) -> Result<()> {
        grant.object_id.validate("object_id")?;
        grant.sid.validate("sid")?;
        let mut txn = self.backend.begin_write()?;
        require_object(&txn, &grant.object_id)?;
        txn.put_grant(grant)?;
        txn.commit()?;
        log::debug!(
            "Upserted grant {} on {} for {}",
            grant.permissions,
            grant.object_id,
            grant.sid
        );
        Ok(())
    }

    /// The direct grant for `(object_id, sid)`, if one exists.
    pub fn get(&self, object_id: &ObjectId, sid: &Sid) -> Result<Option<Grant>> {
        let txn = self.backend.begin_read()?;
        Ok(txn
            .get_grant(object_id, sid)?
            .map(|permissions| Grant::new(object_id.clone(), sid.clone(), permissions)))
    }

    /// Every direct grant on `object_id`, ordered by sid.
    pub fn list_by_object(&self, object_id: &ObjectId) -> Result<Vec<Grant>> {
        let txn = self.backend.begin_read()?;
        txn.grants_for_object(object_id)
    }

    /// Remove every grant on `object_id`. Returns how many were removed.
    pub fn delete_by_object(&self, object_id: &ObjectId) -> Result<usize> {
        self.delete_by_objects(std::slice::from_ref(object_id))
    }

    /// Remove every grant on each of `object_ids` in one transaction.
    ///
    /// Either all listed objects lose their grants or none do.
    pub fn delete_by_objects(&self, object_ids: &[ObjectId]) -> Result<usize> {
        let object_ids = unique_ids("object_ids", object_ids)?;
        let mut txn = self.backend.begin_write()?;
        let mut removed = 0;
        for object_id in &object_ids {
            removed += txn.remove_grants_for_object(object_id)?;
        }
        txn.commit()?;
        log::info!(
            "Removed {removed} grant(s) from {} object(s)",
            object_ids.len()
        );
        Ok(removed)
    }
}
