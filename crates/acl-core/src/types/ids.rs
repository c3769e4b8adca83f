//! Identifier types for protected objects and principals.
//!
//! Both identifiers are opaque strings. UUIDs are the usual shape but any
//! string passing [`validate_identifier`] is accepted.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum identifier length in bytes.
pub const MAX_IDENTIFIER_LEN: usize = 255;

/// Check that `value` is usable as an identifier.
///
/// Identifiers must be non-empty after trimming, at most
/// [`MAX_IDENTIFIER_LEN`] bytes, and free of control characters.
pub fn validate_identifier(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_field(field, "identifier must not be empty"));
    }
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(Error::invalid_field(
            field,
            format!(
                "identifier is {} bytes, maximum is {MAX_IDENTIFIER_LEN}",
                value.len()
            ),
        ));
    }
    if value.chars().any(char::is_control) {
        return Err(Error::invalid_field(
            field,
            "identifier must not contain control characters",
        ));
    }
    Ok(())
}

/// Identifier of a protected object.
///
/// # Examples
///
/// ```
/// use acl_core::ObjectId;
///
/// let id = ObjectId::new("course-42");
/// assert_eq!(id.as_str(), "course-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Creates an object ID from a string without validating it.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Creates a new random object ID (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the object ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates this ID, reporting failures against `field`.
    pub fn validate(&self, field: &str) -> Result<()> {
        validate_identifier(field, &self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<Uuid> for ObjectId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        validate_identifier("object_id", s)?;
        Ok(Self(s.to_string()))
    }
}

/// Security identifier: the user or group a grant applies to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sid(String);

impl Sid {
    /// Creates a sid from a string without validating it.
    pub fn new<S: Into<String>>(sid: S) -> Self {
        Self(sid.into())
    }

    /// Returns the sid as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates this sid, reporting failures against `field`.
    pub fn validate(&self, field: &str) -> Result<()> {
        validate_identifier(field, &self.0)
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Sid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Sid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<Uuid> for Sid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }
}

impl AsRef<str> for Sid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Sid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        validate_identifier("sid", s)?;
        Ok(Self(s.to_string()))
    }
}
