//! CRUD permission flags.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four operations a grant covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Create children or content under the object.
    Create,
    /// Read the object.
    Read,
    /// Modify the object.
    Update,
    /// Delete the object.
    Delete,
}

impl Permission {
    /// All four permissions in CRUD order.
    pub const ALL: [Permission; 4] = [
        Permission::Create,
        Permission::Read,
        Permission::Update,
        Permission::Delete,
    ];

    fn letter(self) -> char {
        match self {
            Permission::Create => 'c',
            Permission::Read => 'r',
            Permission::Update => 'u',
            Permission::Delete => 'd',
        }
    }

    fn bit(self) -> u8 {
        match self {
            Permission::Create => 0b0001,
            Permission::Read => 0b0010,
            Permission::Update => 0b0100,
            Permission::Delete => 0b1000,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Permission::Create => "create",
            Permission::Read => "read",
            Permission::Update => "update",
            Permission::Delete => "delete",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "create" => Ok(Permission::Create),
            "r" | "read" => Ok(Permission::Read),
            "u" | "update" => Ok(Permission::Update),
            "d" | "delete" => Ok(Permission::Delete),
            other => Err(Error::invalid_field(
                "permission",
                format!("unknown permission '{other}'"),
            )),
        }
    }
}

/// The four CRUD flags of a grant or an effective resolution.
///
/// Serialized with `_permission`-suffixed field names
/// (`create_permission`, ...). A value with every flag `false` is a
/// meaningful explicit deny when stored as a grant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permissions {
    /// May create.
    #[serde(rename = "create_permission", default)]
    pub create: bool,
    /// May read.
    #[serde(rename = "read_permission", default)]
    pub read: bool,
    /// May update.
    #[serde(rename = "update_permission", default)]
    pub update: bool,
    /// May delete.
    #[serde(rename = "delete_permission", default)]
    pub delete: bool,
}

impl Permissions {
    /// Every flag set.
    pub const ALL: Permissions = Permissions {
        create: true,
        read: true,
        update: true,
        delete: true,
    };

    /// No flag set.
    pub const NONE: Permissions = Permissions {
        create: false,
        read: false,
        update: false,
        delete: false,
    };

    /// Creates a flag set from four booleans in CRUD order.
    pub const fn new(create: bool, read: bool, update: bool, delete: bool) -> Self {
        Self {
            create,
            read,
            update,
            delete,
        }
    }

    /// Read-only flags.
    pub const fn read_only() -> Self {
        Self::new(false, true, false, false)
    }

    /// Returns whether `permission` is granted.
    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::Create => self.create,
            Permission::Read => self.read,
            Permission::Update => self.update,
            Permission::Delete => self.delete,
        }
    }

    /// Returns a copy with `permission` set to `value`.
    pub fn with(mut self, permission: Permission, value: bool) -> Self {
        match permission {
            Permission::Create => self.create = value,
            Permission::Read => self.read = value,
            Permission::Update => self.update = value,
            Permission::Delete => self.delete = value,
        }
        self
    }

    /// Returns `true` when no flag is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Packs the flags into the low four bits of a byte.
    pub fn bits(&self) -> u8 {
        Permission::ALL
            .iter()
            .filter(|p| self.allows(**p))
            .fold(0, |acc, p| acc | p.bit())
    }

    /// Unpacks flags produced by [`Permissions::bits`].
    ///
    /// Fails if any of the upper four bits is set.
    pub fn from_bits(bits: u8) -> Result<Self> {
        if bits & 0xF0 != 0 {
            return Err(Error::storage(format!(
                "invalid permission bits {bits:#010b}"
            )));
        }
        Ok(Permission::ALL
            .iter()
            .fold(Self::NONE, |acc, p| acc.with(*p, bits & p.bit() != 0)))
    }
}

/// Renders as four positions, `c`/`r`/`u`/`d` or `-`: read-only is `-r--`.
impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in Permission::ALL {
            let c = if self.allows(p) { p.letter() } else { '-' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Parses `all`, `none`, or any combination of the letters `c`, `r`, `u`,
/// `d` with `-` as filler (`cr`, `-r--`, `crud`).
impl std::str::FromStr for Permissions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "all" => return Ok(Self::ALL),
            "none" => return Ok(Self::NONE),
            "" => {
                return Err(Error::invalid_input(
                    "empty permission string; use `none` or `-` to deny",
                ));
            }
            _ => {}
        }

        let mut perms = Self::NONE;
        for c in s.chars() {
            if c == '-' {
                continue;
            }
            let permission = Permission::ALL
                .into_iter()
                .find(|p| p.letter() == c)
                .ok_or_else(|| {
                    Error::invalid_field(
                        "permissions",
                        format!("unknown permission letter '{c}' in '{s}'"),
                    )
                })?;
            if perms.allows(permission) {
                return Err(Error::invalid_field(
                    "permissions",
                    format!("permission '{permission}' given twice in '{s}'"),
                ));
            }
            perms = perms.with(permission, true);
        }
        Ok(perms)
    }
}
