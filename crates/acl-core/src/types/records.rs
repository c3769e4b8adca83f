//! Stored records: objects in the hierarchy and direct grants.

use super::{ObjectId, Permissions, Sid};
use serde::{Deserialize, Serialize};

/// A protected object in the hierarchy.
///
/// Objects form a forest through `parent` links. The `owner` is implicitly
/// granted every permission on the object unless an explicit grant for the
/// owner says otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    /// Object identifier.
    pub id: ObjectId,
    /// Parent object, `None` for a root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ObjectId>,
    /// Owning principal.
    pub owner: Sid,
}

impl Object {
    /// Creates a root object.
    pub fn root(id: impl Into<ObjectId>, owner: impl Into<Sid>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            owner: owner.into(),
        }
    }

    /// Creates an object under `parent`.
    pub fn child(
        id: impl Into<ObjectId>,
        parent: impl Into<ObjectId>,
        owner: impl Into<Sid>,
    ) -> Self {
        Self {
            id: id.into(),
            parent: Some(parent.into()),
            owner: owner.into(),
        }
    }

    /// Returns `true` if the object has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns `true` if `sid` owns this object.
    pub fn is_owned_by(&self, sid: &Sid) -> bool {
        &self.owner == sid
    }
}

/// A direct grant of CRUD flags to one sid on one object.
///
/// Keyed by `(object_id, sid)`; at most one grant exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Object the grant is attached to.
    pub object_id: ObjectId,
    /// Principal receiving the grant.
    pub sid: Sid,
    /// Granted flags.
    #[serde(flatten)]
    pub permissions: Permissions,
}

impl Grant {
    /// Creates a grant.
    pub fn new(
        object_id: impl Into<ObjectId>,
        sid: impl Into<Sid>,
        permissions: Permissions,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            sid: sid.into(),
            permissions,
        }
    }
}
