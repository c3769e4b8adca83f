//! Persistent backend on top of the `redb` embedded database.
//!
//! Three tables:
//!
//! - `objects`: `id` → JSON `{parent, owner}`
//! - `grants`: `(object_id, sid)` → permission bits
//! - `retired`: ids of deleted objects
//!
//! redb provides exactly the guarantees [`Backend`] asks for: MVCC read
//! snapshots that never block, a single serialized writer, and atomic commit
//! with implicit rollback when a write transaction is dropped.

use acl_core::{
    Backend, Error, Grant, Object, ObjectId, Permissions, ReadTxn, Result, Sid, WriteTxn,
};
use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

const OBJECTS: TableDefinition<&str, &[u8]> = TableDefinition::new("objects");
const GRANTS: TableDefinition<(&str, &str), u8> = TableDefinition::new("grants");
const RETIRED: TableDefinition<&str, ()> = TableDefinition::new("retired");

/// Stored form of an object; the id is the table key.
#[derive(Serialize, Deserialize)]
struct ObjectRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
    owner: String,
}

fn storage<E>(context: &'static str) -> impl FnOnce(E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |e| Error::storage_with_source(context, e)
}

// ============================================================================
// RedbBackend
// ============================================================================

/// ACL storage in a redb database file (or in memory, for tests).
pub struct RedbBackend {
    db: Database,
    location: String,
}

impl RedbBackend {
    /// Open the database at `path`, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = Database::create(path).map_err(storage("failed to open database"))?;
        let backend = Self {
            db,
            location: path.display().to_string(),
        };
        backend.ensure_tables()?;
        log::info!("Opened ACL database at {}", backend.location);
        Ok(backend)
    }

    /// Create a database that lives only in memory.
    pub fn in_memory() -> Result<Self> {
        let db = redb::Builder::new()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(storage("failed to create in-memory database"))?;
        let backend = Self {
            db,
            location: ":memory:".to_string(),
        };
        backend.ensure_tables()?;
        Ok(backend)
    }

    /// Where the database lives (`:memory:` for in-memory databases).
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Read transactions fail on tables that were never created, so create
    /// them all up front.
    fn ensure_tables(&self) -> Result<()> {
        let txn = self.db.begin_write().map_err(storage("begin write"))?;
        txn.open_table(OBJECTS).map_err(storage("open objects table"))?;
        txn.open_table(GRANTS).map_err(storage("open grants table"))?;
        txn.open_table(RETIRED).map_err(storage("open retired table"))?;
        txn.commit().map_err(storage("commit"))
    }
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend")
            .field("location", &self.location)
            .finish()
    }
}

impl Backend for RedbBackend {
    type Read<'a>
        = RedbRead
    where
        Self: 'a;
    type Write<'a>
        = RedbWrite
    where
        Self: 'a;

    fn name(&self) -> &'static str {
        "redb"
    }

    fn begin_read(&self) -> Result<RedbRead> {
        let txn = self.db.begin_read().map_err(storage("begin read"))?;
        Ok(RedbRead { txn })
    }

    fn begin_write(&self) -> Result<RedbWrite> {
        let txn = self.db.begin_write().map_err(storage("begin write"))?;
        Ok(RedbWrite { txn })
    }
}

// ============================================================================
// Shared table access
// ============================================================================

fn read_object(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    id: &ObjectId,
) -> Result<Option<Object>> {
    let Some(guard) = table.get(id.as_str()).map_err(storage("read object"))? else {
        return Ok(None);
    };
    let record: ObjectRecord = serde_json::from_slice(guard.value())?;
    Ok(Some(Object {
        id: id.clone(),
        parent: record.parent.map(ObjectId::new),
        owner: Sid::new(record.owner),
    }))
}

fn read_grant(
    table: &impl ReadableTable<(&'static str, &'static str), u8>,
    object_id: &ObjectId,
    sid: &Sid,
) -> Result<Option<Permissions>> {
    table
        .get((object_id.as_str(), sid.as_str()))
        .map_err(storage("read grant"))?
        .map(|guard| Permissions::from_bits(guard.value()))
        .transpose()
}

fn read_grants_for_object(
    table: &impl ReadableTable<(&'static str, &'static str), u8>,
    object_id: &ObjectId,
) -> Result<Vec<Grant>> {
    let mut grants = Vec::new();
    let range = table
        .range((object_id.as_str(), "")..)
        .map_err(storage("scan grants"))?;
    for entry in range {
        let (key, value) = entry.map_err(storage("scan grants"))?;
        let (oid, sid) = key.value();
        if oid != object_id.as_str() {
            break;
        }
        grants.push(Grant::new(
            object_id.clone(),
            sid,
            Permissions::from_bits(value.value())?,
        ));
    }
    Ok(grants)
}

fn read_retired(table: &impl ReadableTable<&'static str, ()>, id: &ObjectId) -> Result<bool> {
    Ok(table
        .get(id.as_str())
        .map_err(storage("read retired id"))?
        .is_some())
}

// ============================================================================
// Transactions
// ============================================================================

/// Read snapshot over a redb database.
pub struct RedbRead {
    txn: ReadTransaction,
}

impl ReadTxn for RedbRead {
    fn get_object(&self, id: &ObjectId) -> Result<Option<Object>> {
        let table = self
            .txn
            .open_table(OBJECTS)
            .map_err(storage("open objects table"))?;
        read_object(&table, id)
    }

    fn get_grant(&self, object_id: &ObjectId, sid: &Sid) -> Result<Option<Permissions>> {
        let table = self
            .txn
            .open_table(GRANTS)
            .map_err(storage("open grants table"))?;
        read_grant(&table, object_id, sid)
    }

    fn grants_for_object(&self, object_id: &ObjectId) -> Result<Vec<Grant>> {
        let table = self
            .txn
            .open_table(GRANTS)
            .map_err(storage("open grants table"))?;
        read_grants_for_object(&table, object_id)
    }

    fn is_retired(&self, id: &ObjectId) -> Result<bool> {
        let table = self
            .txn
            .open_table(RETIRED)
            .map_err(storage("open retired table"))?;
        read_retired(&table, id)
    }
}

/// The single live write transaction of a redb database.
pub struct RedbWrite {
    txn: WriteTransaction,
}

impl ReadTxn for RedbWrite {
    fn get_object(&self, id: &ObjectId) -> Result<Option<Object>> {
        let table = self
            .txn
            .open_table(OBJECTS)
            .map_err(storage("open objects table"))?;
        read_object(&table, id)
    }

    fn get_grant(&self, object_id: &ObjectId, sid: &Sid) -> Result<Option<Permissions>> {
        let table = self
            .txn
            .open_table(GRANTS)
            .map_err(storage("open grants table"))?;
        read_grant(&table, object_id, sid)
    }

    fn grants_for_object(&self, object_id: &ObjectId) -> Result<Vec<Grant>> {
        let table = self
            .txn
            .open_table(GRANTS)
            .map_err(storage("open grants table"))?;
        read_grants_for_object(&table, object_id)
    }

    fn is_retired(&self, id: &ObjectId) -> Result<bool> {
        let table = self
            .txn
            .open_table(RETIRED)
            .map_err(storage("open retired table"))?;
        read_retired(&table, id)
    }
}

impl WriteTxn for RedbWrite {
    fn put_object(&mut self, object: &Object) -> Result<()> {
        let record = ObjectRecord {
            parent: object.parent.as_ref().map(|p| p.as_str().to_string()),
            owner: object.owner.as_str().to_string(),
        };
        let bytes = serde_json::to_vec(&record)?;
        let mut table = self
            .txn
            .open_table(OBJECTS)
            .map_err(storage("open objects table"))?;
        table
            .insert(object.id.as_str(), bytes.as_slice())
            .map_err(storage("write object"))?;
        Ok(())
    }

    fn remove_object(&mut self, id: &ObjectId) -> Result<bool> {
        let mut table = self
            .txn
            .open_table(OBJECTS)
            .map_err(storage("open objects table"))?;
        let removed = table
            .remove(id.as_str())
            .map_err(storage("remove object"))?;
        Ok(removed.is_some())
    }

    fn retire_object(&mut self, id: &ObjectId) -> Result<()> {
        let mut table = self
            .txn
            .open_table(RETIRED)
            .map_err(storage("open retired table"))?;
        table
            .insert(id.as_str(), ())
            .map_err(storage("retire object"))?;
        Ok(())
    }

    fn put_grant(&mut self, grant: &Grant) -> Result<()> {
        let mut table = self
            .txn
            .open_table(GRANTS)
            .map_err(storage("open grants table"))?;
        table
            .insert(
                (grant.object_id.as_str(), grant.sid.as_str()),
                grant.permissions.bits(),
            )
            .map_err(storage("write grant"))?;
        Ok(())
    }

    fn remove_grants_for_object(&mut self, object_id: &ObjectId) -> Result<usize> {
        let mut table = self
            .txn
            .open_table(GRANTS)
            .map_err(storage("open grants table"))?;
        let sids: Vec<Sid> = read_grants_for_object(&table, object_id)?
            .into_iter()
            .map(|g| g.sid)
            .collect();
        for sid in &sids {
            table
                .remove((object_id.as_str(), sid.as_str()))
                .map_err(storage("remove grant"))?;
        }
        Ok(sids.len())
    }

    fn commit(self) -> Result<()> {
        self.txn.commit().map_err(storage("commit"))
    }
}
