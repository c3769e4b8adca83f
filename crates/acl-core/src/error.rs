//! Error types for the ACL core library.

use std::fmt;
use std::path::Path;

/// Errors that can occur while managing objects, grants, and resolutions.
///
/// The hierarchy variants (`CycleDetected`, `BrokenChain`) indicate stored
/// data that violates the forest invariant. They are reported, never repaired.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An object (or another expected record) does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up ("object", "parent object", ...)
        kind: &'static str,
        /// Identifier that was not found
        id: String,
    },

    /// An object with this identifier already exists.
    #[error("Conflict: {kind} already exists: {id}")]
    Conflict {
        /// What collided
        kind: &'static str,
        /// Identifier that collided
        id: String,
    },

    /// An ancestor walk revisited an identifier.
    #[error("Cycle detected in object hierarchy at {id}")]
    CycleDetected {
        /// First identifier seen twice
        id: String,
    },

    /// An ancestor walk reached a parent link whose target does not exist.
    #[error("Broken ancestor chain: {id} references missing parent {parent}")]
    BrokenChain {
        /// Object holding the dangling parent link
        id: String,
        /// Parent identifier that could not be found
        parent: String,
    },

    /// Malformed identifiers, empty batches, and similar caller mistakes.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Field or argument that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// The storage backend failed.
    #[error("Storage error: {message}")]
    Storage {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error, optionally tied to a path.
    #[error("I/O error{}: {source}", display_path(.path))]
    Io {
        /// Path involved, if any
        path: Option<String>,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },
}

fn display_path(path: &Option<String>) -> String {
    match path {
        Some(p) => format!(" at {p}"),
        None => String::new(),
    }
}

/// Convenience `Result` type alias for ACL operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
///
/// Boundaries (transports, the admin CLI) map kinds onto their own status
/// vocabulary; the core itself never branches on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Object or expected row absent
    NotFound,
    /// Duplicate identifier on create
    Conflict,
    /// Hierarchy revisits an identifier
    CycleDetected,
    /// Hierarchy points at a missing parent
    BrokenChain,
    /// Caller supplied malformed input
    InvalidInput,
    /// Storage, I/O, serialization, or configuration failure
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::CycleDetected => "cycle_detected",
            ErrorKind::BrokenChain => "broken_chain",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

impl Error {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Conflict { .. } => ErrorKind::Conflict,
            Error::CycleDetected { .. } => ErrorKind::CycleDetected,
            Error::BrokenChain { .. } => ErrorKind::BrokenChain,
            Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::Storage { .. }
            | Error::Serialization(_)
            | Error::Io { .. }
            | Error::Config { .. } => ErrorKind::Internal,
        }
    }

    /// Returns `true` for errors that indicate corrupted hierarchy data.
    pub fn is_consistency_error(&self) -> bool {
        matches!(
            self,
            Error::CycleDetected { .. } | Error::BrokenChain { .. }
        )
    }

    /// Creates a not-found error.
    pub fn not_found<S: Into<String>>(kind: &'static str, id: S) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict<S: Into<String>>(kind: &'static str, id: S) -> Self {
        Error::Conflict {
            kind,
            id: id.into(),
        }
    }

    /// Creates an invalid-input error.
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Error::InvalidInput {
            field: None,
            message: message.into(),
        }
    }

    /// Creates an invalid-input error naming the offending field.
    pub fn invalid_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::InvalidInput {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a storage error with a message.
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Error::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a storage error with a message and source error.
    pub fn storage_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an I/O error tied to a path.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: Some(path.as_ref().display().to_string()),
            source,
        }
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { path: None, source }
    }
}
