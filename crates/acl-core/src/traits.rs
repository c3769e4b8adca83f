//! Storage backend and transaction traits.
//!
//! The engine never talks to a storage engine directly. It opens a
//! [`ReadTxn`] or [`WriteTxn`] from a [`Backend`] and performs every logical
//! operation (a resolution walk, a bulk upsert, a cascade delete) inside one
//! transaction.
//!
//! Backends must provide:
//!
//! - **Snapshot reads**: everything read through one [`ReadTxn`] reflects a
//!   single committed state, and opening one never waits for a writer.
//! - **Serialized writes**: at most one [`WriteTxn`] is live at a time; a
//!   second `begin_write` waits for the first to commit or drop.
//! - **Atomic commit**: changes made through a [`WriteTxn`] become visible all
//!   at once on [`WriteTxn::commit`], and are discarded if the transaction is
//!   dropped without committing.
//!
//! The primitives are deliberately dumb. `put_object` and `put_grant`
//! overwrite unconditionally; existence checks, conflict detection, and
//! cascades live in the engine so every backend behaves the same.

use crate::{Grant, Object, ObjectId, Permissions, Result, Sid};

/// Read access to one consistent snapshot of objects and grants.
pub trait ReadTxn {
    /// Fetch an object record.
    fn get_object(&self, id: &ObjectId) -> Result<Option<Object>>;

    /// Fetch the direct grant for `(object_id, sid)`.
    fn get_grant(&self, object_id: &ObjectId, sid: &Sid) -> Result<Option<Permissions>>;

    /// All direct grants attached to `object_id`, ordered by sid.
    fn grants_for_object(&self, object_id: &ObjectId) -> Result<Vec<Grant>>;

    /// Returns `true` if `id` belonged to an object that has been deleted.
    fn is_retired(&self, id: &ObjectId) -> Result<bool>;
}

/// Write access; reads observe the transaction's own uncommitted writes.
pub trait WriteTxn: ReadTxn {
    /// Insert or replace an object record.
    fn put_object(&mut self, object: &Object) -> Result<()>;

    /// Remove an object record. Returns `false` if it did not exist.
    fn remove_object(&mut self, id: &ObjectId) -> Result<bool>;

    /// Record that `id` was deleted. Retired ids are never reused, since
    /// orphaned descendants may still name them as parent.
    fn retire_object(&mut self, id: &ObjectId) -> Result<()>;

    /// Insert or replace the full grant row for `(grant.object_id, grant.sid)`.
    fn put_grant(&mut self, grant: &Grant) -> Result<()>;

    /// Remove every grant attached to `object_id`. Returns how many were removed.
    fn remove_grants_for_object(&mut self, object_id: &ObjectId) -> Result<usize>;

    /// Make all changes visible atomically.
    fn commit(self) -> Result<()>
    where
        Self: Sized;
}

/// A transactional store for objects and grants.
pub trait Backend: Send + Sync {
    /// Read transaction type.
    type Read<'a>: ReadTxn
    where
        Self: 'a;

    /// Write transaction type.
    type Write<'a>: WriteTxn
    where
        Self: 'a;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Open a read snapshot.
    fn begin_read(&self) -> Result<Self::Read<'_>>;

    /// Open the write transaction, waiting for any other writer to finish.
    fn begin_write(&self) -> Result<Self::Write<'_>>;
}
