//! Resolver: effective permissions of a sid on an object.
//!
//! # Algorithm
//!
//! Walk from the object toward its root inside one read snapshot. At each
//! level, in order:
//!
//! 1. a direct grant for the sid decides, verbatim (an all-false row denies);
//! 2. otherwise, if the sid owns this level, it gets every permission;
//! 3. otherwise move to the parent.
//!
//! If the walk runs off the root, the answer is default deny. The nearest
//! deciding level wins outright: flags are never merged across levels, so a
//! grant or revocation close to the object always shadows anything above it.

use crate::hierarchy::Ancestors;
use acl_core::{Backend, ObjectId, Permission, Permissions, ReadTxn, Result, Sid};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// What decided a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionSource {
    /// A direct grant row on `object_id`.
    Direct {
        /// Level holding the grant.
        object_id: ObjectId,
    },
    /// The sid owns `object_id`.
    Owner {
        /// Level owned by the sid.
        object_id: ObjectId,
    },
    /// Nothing on the chain matched.
    Default,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct { object_id } => write!(f, "direct grant on {object_id}"),
            Self::Owner { object_id } => write!(f, "owner of {object_id}"),
            Self::Default => write!(f, "default deny"),
        }
    }
}

/// Effective permissions of `sid` on `object_id`, with their origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Object queried.
    pub object_id: ObjectId,
    /// Principal queried.
    pub sid: Sid,
    /// Effective flags.
    pub permissions: Permissions,
    /// Level and rule that decided.
    pub source: ResolutionSource,
    /// Number of levels visited, including the deciding one.
    pub depth: usize,
}

/// Resolve within an already open snapshot.
fn resolve_in<T: ReadTxn>(txn: &T, object_id: &ObjectId, sid: &Sid) -> Result<Resolution> {
    let mut depth = 0;
    for level in Ancestors::new(txn, object_id) {
        let level = level?;
        depth += 1;

        let decided = if let Some(permissions) = txn.get_grant(&level.id, sid)? {
            Some((permissions, ResolutionSource::Direct { object_id: level.id }))
        } else if level.is_owned_by(sid) {
            Some((Permissions::ALL, ResolutionSource::Owner { object_id: level.id }))
        } else {
            None
        };

        if let Some((permissions, source)) = decided {
            return Ok(Resolution {
                object_id: object_id.clone(),
                sid: sid.clone(),
                permissions,
                source,
                depth,
            });
        }
    }

    Ok(Resolution {
        object_id: object_id.clone(),
        sid: sid.clone(),
        permissions: Permissions::NONE,
        source: ResolutionSource::Default,
        depth,
    })
}

/// Read-only permission queries over a storage backend.
///
/// Never takes a write lock; each query sees one consistent snapshot.
pub struct Resolver<B> {
    backend: Arc<B>,
}

impl<B> Clone for Resolver<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: Backend> Resolver<B> {
    /// Create a resolver over `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Resolve and explain the effective permissions of `sid` on `object_id`.
    ///
    /// Fails with `NotFound` if the object does not exist, and with
    /// `BrokenChain`/`CycleDetected` if the walk reaches corrupt hierarchy
    /// data before a level decides.
    pub fn resolve(&self, object_id: &ObjectId, sid: &Sid) -> Result<Resolution> {
        object_id.validate("object_id")?;
        sid.validate("sid")?;
        let txn = self.backend.begin_read()?;
        let resolution = resolve_in(&txn, object_id, sid)?;
        log::debug!(
            "Resolved {sid} on {object_id}: {} ({}, depth {})",
            resolution.permissions,
            resolution.source,
            resolution.depth
        );
        Ok(resolution)
    }

    /// Effective flags of `sid` on `object_id`.
    pub fn effective_permissions(&self, object_id: &ObjectId, sid: &Sid) -> Result<Permissions> {
        Ok(self.resolve(object_id, sid)?.permissions)
    }

    /// Does `sid` have `permission` on `object_id`?
    pub fn check(&self, object_id: &ObjectId, sid: &Sid, permission: Permission) -> Result<bool> {
        Ok(self.effective_permissions(object_id, sid)?.allows(permission))
    }
}
