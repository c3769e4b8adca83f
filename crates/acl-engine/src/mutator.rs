//! Mutator: grant upserts and cascading object deletes.
//!
//! Every public operation runs in exactly one write transaction. Validation
//! and existence checks happen inside that transaction before anything is
//! written, so a failure leaves no partial state behind.

use crate::hierarchy::require_object;
use crate::unique_ids;
use acl_core::{Backend, Grant, ObjectId, Permissions, Result, Sid, WriteTxn};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

// ============================================================================
// Batch keys
// ============================================================================

/// The key set of a fan-out grant write.
///
/// Both shapes expand to `(object_id, sid)` pairs that all receive the same
/// flags.
#[derive(Debug, Clone, Copy)]
enum GrantTarget<'a> {
    /// One object, many sids.
    Sids {
        object_id: &'a ObjectId,
        sids: &'a [Sid],
    },
    /// One sid, many objects.
    Objects {
        sid: &'a Sid,
        object_ids: &'a [ObjectId],
    },
}

impl GrantTarget<'_> {
    /// Validated, de-duplicated keys in first-seen order.
    fn keys(&self) -> Result<Vec<(ObjectId, Sid)>> {
        match *self {
            Self::Sids { object_id, sids } => {
                object_id.validate("object_id")?;
                Ok(unique_ids("sids", sids)?
                    .into_iter()
                    .map(|sid| (object_id.clone(), sid))
                    .collect())
            }
            Self::Objects { sid, object_ids } => {
                sid.validate("sid")?;
                Ok(unique_ids("object_ids", object_ids)?
                    .into_iter()
                    .map(|object_id| (object_id, sid.clone()))
                    .collect())
            }
        }
    }
}

/// Outcome of a cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeSummary {
    /// Object records removed.
    pub objects_removed: usize,
    /// Grant rows removed together with them.
    pub grants_removed: usize,
}

// ============================================================================
// Mutator
// ============================================================================

/// Write-side operations over a storage backend.
pub struct Mutator<B> {
    backend: Arc<B>,
}

impl<B> Clone for Mutator<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: Backend> Mutator<B> {
    /// Create a mutator over `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Insert or replace the grant of `sid` on `object_id`.
    ///
    /// Fails with `NotFound` if the object does not exist.
    pub fn upsert_single(
        &self,
        object_id: &ObjectId,
        sid: &Sid,
        permissions: Permissions,
    ) -> Result<()> {
        self.write_batch(
            GrantTarget::Sids {
                object_id,
                sids: std::slice::from_ref(sid),
            },
            permissions,
        )
        .map(|_| ())
    }

    /// Give every sid in `sids` the same flags on `object_id`, atomically.
    ///
    /// Returns the number of distinct rows written.
    pub fn upsert_bulk_by_sids(
        &self,
        object_id: &ObjectId,
        sids: &[Sid],
        permissions: Permissions,
    ) -> Result<usize> {
        self.write_batch(GrantTarget::Sids { object_id, sids }, permissions)
    }

    /// Give `sid` the same flags on every object in `object_ids`, atomically.
    ///
    /// Every object must exist; one missing id fails the whole batch with
    /// `NotFound`.
    pub fn upsert_bulk_by_objects(
        &self,
        sid: &Sid,
        object_ids: &[ObjectId],
        permissions: Permissions,
    ) -> Result<usize> {
        self.write_batch(GrantTarget::Objects { sid, object_ids }, permissions)
    }

    /// Remove `object_id` and all of its grants in one transaction.
    ///
    /// Descendants stay in place; walks through them will report
    /// `BrokenChain` from now on. The id is retired and cannot be created
    /// again.
    pub fn delete_object_cascade(&self, object_id: &ObjectId) -> Result<CascadeSummary> {
        self.cascade(std::slice::from_ref(object_id))
    }

    /// Cascade-delete every object in `object_ids` as one unit.
    ///
    /// If any id is missing nothing is removed and the error names the first
    /// missing id in input order.
    pub fn delete_objects_cascade_bulk(&self, object_ids: &[ObjectId]) -> Result<CascadeSummary> {
        self.cascade(object_ids)
    }

    fn write_batch(&self, target: GrantTarget<'_>, permissions: Permissions) -> Result<usize> {
        let keys = target.keys()?;
        let mut txn = self.backend.begin_write()?;

        let mut checked: HashSet<&ObjectId> = HashSet::new();
        for (object_id, _) in &keys {
            if checked.insert(object_id) {
                require_object(&txn, object_id)?;
            }
        }

        for (object_id, sid) in &keys {
            txn.put_grant(&Grant::new(object_id.clone(), sid.clone(), permissions))?;
        }
        txn.commit()?;

        log::debug!(
            "Wrote {} grant row(s) with {permissions} across {} object(s)",
            keys.len(),
            checked.len()
        );
        Ok(keys.len())
    }

    fn cascade(&self, object_ids: &[ObjectId]) -> Result<CascadeSummary> {
        let object_ids = unique_ids("object_ids", object_ids)?;
        let mut txn = self.backend.begin_write()?;

        for object_id in &object_ids {
            require_object(&txn, object_id)?;
        }

        let mut summary = CascadeSummary::default();
        for object_id in &object_ids {
            summary.grants_removed += txn.remove_grants_for_object(object_id)?;
            if txn.remove_object(object_id)? {
                summary.objects_removed += 1;
            }
            txn.retire_object(object_id)?;
        }
        txn.commit()?;

        log::info!(
            "Cascade-deleted {} object(s) and {} grant(s)",
            summary.objects_removed,
            summary.grants_removed
        );
        Ok(summary)
    }
}
