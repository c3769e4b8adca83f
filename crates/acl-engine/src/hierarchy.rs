//! Ancestor walks over the object hierarchy.
//!
//! The hierarchy is a flat `id → record` index. Walking it means following
//! `parent` links one lookup at a time inside a single transaction, so the
//! walk sees one consistent snapshot.

use acl_core::{Error, Object, ObjectId, ReadTxn, Result};
use std::collections::HashSet;

/// Fetch an object or fail with `NotFound`.
pub(crate) fn require_object<T: ReadTxn>(txn: &T, id: &ObjectId) -> Result<Object> {
    txn.get_object(id)?
        .ok_or_else(|| Error::not_found("object", id.as_str()))
}

/// Lazy child-to-root walk starting at (and including) one object.
///
/// Yields each object on the way up. The walk ends after the root, or after
/// the first error:
///
/// - `NotFound` if the starting object does not exist,
/// - `BrokenChain` if a parent link points at a missing object,
/// - `CycleDetected` if an id comes round a second time.
///
/// Being lazy, a caller that stops early never touches the levels above.
pub struct Ancestors<'t, T> {
    txn: &'t T,
    next: Option<Step>,
    seen: HashSet<ObjectId>,
}

enum Step {
    Start(ObjectId),
    Parent { child: ObjectId, parent: ObjectId },
}

impl<'t, T: ReadTxn> Ancestors<'t, T> {
    /// Start a walk at `id`.
    pub fn new(txn: &'t T, id: &ObjectId) -> Self {
        Self {
            txn,
            next: Some(Step::Start(id.clone())),
            seen: HashSet::new(),
        }
    }

    fn step(&mut self, step: Step) -> Result<Object> {
        let object = match step {
            Step::Start(id) => require_object(self.txn, &id)?,
            Step::Parent { child, parent } => match self.txn.get_object(&parent)? {
                Some(object) => object,
                None => {
                    log::warn!("Object {child} references missing parent {parent}");
                    return Err(Error::BrokenChain {
                        id: child.to_string(),
                        parent: parent.to_string(),
                    });
                }
            },
        };

        if !self.seen.insert(object.id.clone()) {
            log::warn!("Cycle in object hierarchy at {}", object.id);
            return Err(Error::CycleDetected {
                id: object.id.to_string(),
            });
        }

        self.next = object.parent.clone().map(|parent| Step::Parent {
            child: object.id.clone(),
            parent,
        });
        Ok(object)
    }
}

impl<T: ReadTxn> Iterator for Ancestors<'_, T> {
    type Item = Result<Object>;

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.next.take()?;
        Some(self.step(step))
    }
}
