//! Core types for the ACL engine.

mod ids;
mod permissions;
mod proptests;
mod records;

pub use ids::{validate_identifier, ObjectId, Sid, MAX_IDENTIFIER_LEN};
pub use permissions::{Permission, Permissions};
pub use records::{Grant, Object};
