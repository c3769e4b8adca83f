//! # acl-storage
//!
//! Storage backends for the hierarchical ACL engine.
//!
//! - [`RedbBackend`]: persistent, file-backed (or in-memory) redb database
//! - [`MemoryBackend`]: copy-on-write in-process store for tests and embedding
//!
//! Both implement [`acl_core::Backend`] with snapshot reads, a single
//! serialized writer, and atomic commit.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod memory;
pub mod redb_backend;

pub use memory::MemoryBackend;
pub use redb_backend::RedbBackend;
