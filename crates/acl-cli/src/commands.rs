//! Handlers for the data commands (`object`, `grant`, `check`).
//!
//! Every handler writes one JSON document to `out`.

use crate::cli::{GrantAction, ObjectAction};
use acl_core::{Backend, ObjectId, Permission, Permissions, Result, Sid};
use acl_engine::{Acl, ResolutionSource};
use serde::Serialize;
use std::io::Write;

/// Rows written by a grant command.
#[derive(Debug, Serialize)]
struct WriteSummary {
    rows_written: usize,
    permissions: Permissions,
}

/// Rows removed by `grant clear`.
#[derive(Debug, Serialize)]
struct ClearSummary {
    grants_removed: usize,
}

/// Answer to `check --permission`.
#[derive(Debug, Serialize)]
struct CheckOutcome {
    object_id: ObjectId,
    sid: Sid,
    permission: Permission,
    allowed: bool,
    source: ResolutionSource,
}

fn emit<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

// ============================================================================
// Objects
// ============================================================================

/// Run an `aclctl object` action.
pub fn handle_object_command<B, W>(acl: &Acl<B>, action: ObjectAction, out: &mut W) -> Result<()>
where
    B: Backend,
    W: Write,
{
    match action {
        ObjectAction::Add { id, parent, owner } => {
            let id = id.unwrap_or_else(ObjectId::generate);
            let object = acl.objects().create(&id, parent.as_ref(), &owner)?;
            emit(out, &object)
        }
        ObjectAction::Show { id } => emit(out, &acl.objects().get(&id)?),
        ObjectAction::Chain { id } => emit(out, &acl.objects().ancestor_chain(&id)?),
        ObjectAction::Delete { ids } => {
            let summary = match ids.as_slice() {
                [id] => acl.mutator().delete_object_cascade(id)?,
                many => acl.mutator().delete_objects_cascade_bulk(many)?,
            };
            emit(out, &summary)
        }
    }
}

// ============================================================================
// Grants
// ============================================================================

/// Run an `aclctl grant` action.
pub fn handle_grant_command<B, W>(acl: &Acl<B>, action: GrantAction, out: &mut W) -> Result<()>
where
    B: Backend,
    W: Write,
{
    match action {
        GrantAction::Object {
            object_id,
            sids,
            permissions,
        } => {
            let rows_written = match sids.as_slice() {
                [sid] => {
                    acl.mutator().upsert_single(&object_id, sid, permissions)?;
                    1
                }
                many => acl
                    .mutator()
                    .upsert_bulk_by_sids(&object_id, many, permissions)?,
            };
            emit(
                out,
                &WriteSummary {
                    rows_written,
                    permissions,
                },
            )
        }
        GrantAction::Sid {
            sid,
            objects,
            permissions,
        } => {
            let rows_written = acl
                .mutator()
                .upsert_bulk_by_objects(&sid, &objects, permissions)?;
            emit(
                out,
                &WriteSummary {
                    rows_written,
                    permissions,
                },
            )
        }
        GrantAction::List { object_id } => {
            // Distinguish "no grants" from "no such object".
            acl.objects().get(&object_id)?;
            emit(out, &acl.grants().list_by_object(&object_id)?)
        }
        GrantAction::Clear { object_ids } => {
            let grants_removed = acl.grants().delete_by_objects(&object_ids)?;
            emit(out, &ClearSummary { grants_removed })
        }
    }
}

// ============================================================================
// Check
// ============================================================================

/// Run `aclctl check`.
pub fn handle_check<B, W>(
    acl: &Acl<B>,
    object_id: &ObjectId,
    sid: &Sid,
    permission: Option<Permission>,
    out: &mut W,
) -> Result<()>
where
    B: Backend,
    W: Write,
{
    let resolution = acl.resolver().resolve(object_id, sid)?;
    match permission {
        None => emit(out, &resolution),
        Some(permission) => emit(
            out,
            &CheckOutcome {
                object_id: resolution.object_id,
                sid: resolution.sid,
                permission,
                allowed: resolution.permissions.allows(permission),
                source: resolution.source,
            },
        ),
    }
}
