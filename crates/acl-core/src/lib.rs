#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! ACL core library
//!
//! Shared types for the hierarchical access-control engine: identifiers,
//! CRUD permission flags, object and grant records, the error type, and the
//! transaction traits every storage backend implements.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`types`]: Identifiers, permissions, records
//! - [`traits`]: Storage backend and transaction traits

pub mod error;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use error::{Error, ErrorKind, Result};
pub use traits::{Backend, ReadTxn, WriteTxn};
pub use types::{
    validate_identifier, Grant, Object, ObjectId, Permission, Permissions, Sid,
    MAX_IDENTIFIER_LEN,
};
