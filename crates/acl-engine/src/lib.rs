#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! ACL engine
//!
//! Object hierarchy, direct grants, permission resolution, and grant
//! mutation over any [`acl_core::Backend`].
//!
//! # Components
//!
//! - [`ObjectStore`]: create, look up, walk, and delete objects
//! - [`GrantStore`]: direct grant rows keyed by `(object_id, sid)`
//! - [`Resolver`]: effective permissions, nearest level wins
//! - [`Mutator`]: single and bulk upserts, cascading deletes
//!
//! [`Acl`] bundles all four over one shared backend.
//!
//! # Example
//!
//! ```
//! use acl_engine::Acl;
//! use acl_core::{ObjectId, Permissions, Sid};
//! use acl_storage::MemoryBackend;
//!
//! # fn main() -> acl_core::Result<()> {
//! let acl = Acl::new(MemoryBackend::new());
//! let root = ObjectId::new("root");
//! let doc = ObjectId::new("doc");
//! acl.objects().create(&root, None, &Sid::new("alice"))?;
//! acl.objects().create(&doc, Some(&root), &Sid::new("bob"))?;
//! acl.mutator()
//!     .upsert_single(&root, &Sid::new("carol"), Permissions::read_only())?;
//!
//! let perms = acl.resolver().effective_permissions(&doc, &Sid::new("carol"))?;
//! assert_eq!(perms, Permissions::read_only());
//! # Ok(())
//! # }
//! ```

mod hierarchy;

pub mod grant_store;
pub mod mutator;
pub mod object_store;
pub mod resolver;

pub use grant_store::GrantStore;
pub use hierarchy::Ancestors;
pub use mutator::{CascadeSummary, Mutator};
pub use object_store::ObjectStore;
pub use resolver::{Resolution, ResolutionSource, Resolver};

use acl_core::{validate_identifier, Error, Result};
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

/// Validate every id, drop repeats (first occurrence wins), and reject an
/// empty set.
pub(crate) fn unique_ids<T>(field: &str, ids: &[T]) -> Result<Vec<T>>
where
    T: Clone + Eq + Hash + AsRef<str>,
{
    if ids.is_empty() {
        return Err(Error::invalid_field(
            field,
            format!("{field} must contain at least one id"),
        ));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        validate_identifier(field, id.as_ref())?;
        if seen.insert(id) {
            unique.push(id.clone());
        }
    }
    Ok(unique)
}

/// Every component of the engine over one shared backend.
pub struct Acl<B> {
    backend: Arc<B>,
}

impl<B> Clone for Acl<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: acl_core::Backend> Acl<B> {
    /// Wrap `backend`.
    pub fn new(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Share an already wrapped backend.
    pub fn from_arc(backend: Arc<B>) -> Self {
        log::debug!("ACL engine using {} backend", backend.name());
        Self { backend }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Object hierarchy operations.
    pub fn objects(&self) -> ObjectStore<B> {
        ObjectStore::new(Arc::clone(&self.backend))
    }

    /// Direct grant operations.
    pub fn grants(&self) -> GrantStore<B> {
        GrantStore::new(Arc::clone(&self.backend))
    }

    /// Permission queries.
    pub fn resolver(&self) -> Resolver<B> {
        Resolver::new(Arc::clone(&self.backend))
    }

    /// Grant writes and cascading deletes.
    pub fn mutator(&self) -> Mutator<B> {
        Mutator::new(Arc::clone(&self.backend))
    }
}
