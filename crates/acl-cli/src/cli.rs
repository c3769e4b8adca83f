//! Command-line argument definitions.

use acl_core::{ObjectId, Permission, Permissions, Sid};
use clap::{Parser, Subcommand};

/// Validating parser for object id arguments.
fn parse_object_id(s: &str) -> acl_core::Result<ObjectId> {
    s.parse()
}

/// Validating parser for sid arguments.
fn parse_sid(s: &str) -> acl_core::Result<Sid> {
    s.parse()
}

/// aclctl - hierarchical ACL administration
#[derive(Parser, Debug)]
#[command(name = "aclctl", version)]
#[command(about = "Administer hierarchical CRUD access-control lists", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Database file, overriding the configuration
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Object hierarchy operations
    Object {
        /// Object action
        #[command(subcommand)]
        action: ObjectAction,
    },
    /// Direct grant operations
    Grant {
        /// Grant action
        #[command(subcommand)]
        action: GrantAction,
    },
    /// Resolve the effective permissions of a sid on an object
    Check {
        /// Object to query
        #[arg(value_parser = parse_object_id)]
        object_id: ObjectId,
        /// Principal to query
        #[arg(value_parser = parse_sid)]
        sid: Sid,
        /// Only answer whether this one permission (c, r, u, d) is held
        #[arg(short, long)]
        permission: Option<Permission>,
    },
    /// Configuration management
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `aclctl object ...`
#[derive(Subcommand, Debug)]
pub enum ObjectAction {
    /// Register a new object
    Add {
        /// New object id; generated when omitted
        #[arg(value_parser = parse_object_id)]
        id: Option<ObjectId>,
        /// Parent object
        #[arg(short, long, value_parser = parse_object_id)]
        parent: Option<ObjectId>,
        /// Owning sid, implicitly granted every permission
        #[arg(short, long, value_parser = parse_sid)]
        owner: Sid,
    },
    /// Show one object
    Show {
        /// Object id
        #[arg(value_parser = parse_object_id)]
        id: ObjectId,
    },
    /// List an object's ancestors, child first
    Chain {
        /// Object id
        #[arg(value_parser = parse_object_id)]
        id: ObjectId,
    },
    /// Delete objects together with their grants
    Delete {
        /// Object ids; all are removed or none
        #[arg(required = true, value_parser = parse_object_id)]
        ids: Vec<ObjectId>,
    },
}

/// `aclctl grant ...`
#[derive(Subcommand, Debug)]
pub enum GrantAction {
    /// Grant one or more sids the same permissions on one object
    Object {
        /// Object id
        #[arg(value_parser = parse_object_id)]
        object_id: ObjectId,
        /// Sids to grant (repeatable)
        #[arg(short, long = "sid", required = true, value_parser = parse_sid)]
        sids: Vec<Sid>,
        /// Permissions, e.g. `cr`, `-r--`, `all`, `none`
        #[arg(short, long)]
        permissions: Permissions,
    },
    /// Grant one sid the same permissions on one or more objects
    Sid {
        /// Sid
        #[arg(value_parser = parse_sid)]
        sid: Sid,
        /// Objects to grant on (repeatable)
        #[arg(short, long = "object", required = true, value_parser = parse_object_id)]
        objects: Vec<ObjectId>,
        /// Permissions, e.g. `cr`, `-r--`, `all`, `none`
        #[arg(short, long)]
        permissions: Permissions,
    },
    /// List the direct grants on an object
    List {
        /// Object id
        #[arg(value_parser = parse_object_id)]
        object_id: ObjectId,
    },
    /// Remove every direct grant on the given objects
    Clear {
        /// Object ids
        #[arg(required = true, value_parser = parse_object_id)]
        object_ids: Vec<ObjectId>,
    },
}

/// `aclctl config ...`
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the config file path in use
    Path,
    /// Print the effective configuration
    Show,
    /// Print one value by dotted key, e.g. `database.path`
    Get {
        /// Dotted key
        key: String,
    },
    /// Set one value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Write a default config file
    Init {
        /// Destination, defaulting to the standard location
        #[arg(short, long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
