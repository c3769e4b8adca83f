//! # acl-cli
//!
//! Admin CLI (`aclctl`) for hierarchical ACL databases:
//! - Object registration, inspection, and cascading deletion
//! - Single and bulk grant writes
//! - Permission checks with an explanation of what decided them
//! - Configuration management

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;

use acl_core::ErrorKind;

/// Process exit code for a failed command.
pub fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::InvalidInput => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Conflict => 4,
        ErrorKind::CycleDetected | ErrorKind::BrokenChain => 5,
        ErrorKind::Internal => 1,
    }
}
