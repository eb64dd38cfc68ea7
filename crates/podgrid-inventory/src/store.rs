//! InventoryStore — redb-backed inventory persistence for PodGrid.
//!
//! Provides typed put/get/list/delete operations over every inventory
//! entity. Values are JSON-serialized into redb's `&[u8]` value columns.
//! The store supports both on-disk and in-memory backends (the latter for
//! testing and one-shot CLI runs).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, TableHandle, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use pod_core::{ResourceId, ResourceKind};

use crate::error::{InventoryError, InventoryResult};
use crate::inventory::Inventory;
use crate::tables::*;
use crate::types::*;

type Table = TableDefinition<'static, &'static str, &'static [u8]>;

/// Closure factory turning a redb error into an `InventoryError`, optionally
/// tagged with the table it came from.
macro_rules! map_err {
    ($variant:ident) => {
        |e| InventoryError::$variant(e.to_string())
    };
    ($variant:ident, $table:expr) => {
        |e| InventoryError::$variant {
            table: $table.name().to_string(),
            reason: e.to_string(),
        }
    };
}

/// Thread-safe inventory store backed by redb.
#[derive(Clone)]
pub struct InventoryStore {
    db: Arc<Database>,
}

impl InventoryStore {
    /// Open (or create) a persistent inventory store at the given path.
    pub fn open(path: &Path) -> InventoryResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "inventory store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory inventory store.
    pub fn open_in_memory() -> InventoryResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory inventory store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> InventoryResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        for table in ALL {
            txn.open_table(table).map_err(map_err!(Table, table))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Generic table access ───────────────────────────────────────

    fn put<T: Serialize>(&self, table: Table, key: &ResourceId, value: &T) -> InventoryResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        insert(&txn, table, key, value)?;
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, "inventory entity stored");
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, definition: Table, key: &ResourceId) -> InventoryResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(definition).map_err(map_err!(Table, definition))?;
        let Some(guard) = table.get(key.as_str()).map_err(map_err!(Read, definition))? else {
            return Ok(None);
        };
        let value = serde_json::from_slice(guard.value()).map_err(map_err!(Corrupt, definition))?;
        Ok(Some(value))
    }

    fn list<T: DeserializeOwned>(&self, definition: Table) -> InventoryResult<Vec<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(definition).map_err(map_err!(Table, definition))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read, definition))? {
            let (_, value) = entry.map_err(map_err!(Read, definition))?;
            results.push(serde_json::from_slice(value.value()).map_err(map_err!(Corrupt, definition))?);
        }
        Ok(results)
    }

    fn delete(&self, definition: Table, key: &ResourceId) -> InventoryResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(definition).map_err(map_err!(Table, definition))?;
            existed = table
                .remove(key.as_str())
                .map_err(|e| write_error(definition, key, e))?
                .is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, existed, "inventory entity deleted");
        Ok(existed)
    }

    // ── Bulk import ────────────────────────────────────────────────

    /// Write every entity of a snapshot in a single transaction.
    pub fn import(&self, doc: &InventoryDocument) -> InventoryResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        for system in &doc.systems {
            insert(&txn, SYSTEMS, &system.id, system)?;
        }
        for chassis in &doc.chassis {
            insert(&txn, CHASSIS, &chassis.id, chassis)?;
        }
        for drive in &doc.drives {
            insert(&txn, DRIVES, &drive.id, drive)?;
        }
        for processor in &doc.processors {
            insert(&txn, PROCESSORS, &processor.id, processor)?;
        }
        for switch in &doc.switches {
            insert(&txn, SWITCHES, &switch.id, switch)?;
        }
        for port in &doc.ports {
            insert(&txn, PORTS, &port.id, port)?;
        }
        for endpoint in &doc.endpoints {
            insert(&txn, ENDPOINTS, &endpoint.id, endpoint)?;
        }
        for port in &doc.ethernet_switch_ports {
            insert(&txn, ETHERNET_SWITCH_PORTS, &port.id, port)?;
        }
        for volume in &doc.volumes {
            insert(&txn, VOLUMES, &volume.id, volume)?;
        }
        for pool in &doc.storage_pools {
            insert(&txn, STORAGE_POOLS, &pool.id, pool)?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(
            systems = doc.systems.len(),
            chassis = doc.chassis.len(),
            drives = doc.drives.len(),
            "inventory document imported"
        );
        Ok(())
    }

    // ── Typed accessors ────────────────────────────────────────────

    pub fn put_system(&self, system: &ComputerSystem) -> InventoryResult<()> {
        self.put(SYSTEMS, &system.id, system)
    }

    pub fn delete_system(&self, id: &ResourceId) -> InventoryResult<bool> {
        self.delete(SYSTEMS, id)
    }

    pub fn put_chassis(&self, chassis: &Chassis) -> InventoryResult<()> {
        self.put(CHASSIS, &chassis.id, chassis)
    }

    pub fn put_drive(&self, drive: &Drive) -> InventoryResult<()> {
        self.put(DRIVES, &drive.id, drive)
    }

    pub fn delete_drive(&self, id: &ResourceId) -> InventoryResult<bool> {
        self.delete(DRIVES, id)
    }

    pub fn put_processor(&self, processor: &Processor) -> InventoryResult<()> {
        self.put(PROCESSORS, &processor.id, processor)
    }

    pub fn put_switch(&self, switch: &Switch) -> InventoryResult<()> {
        self.put(SWITCHES, &switch.id, switch)
    }

    pub fn put_port(&self, port: &Port) -> InventoryResult<()> {
        self.put(PORTS, &port.id, port)
    }

    pub fn put_endpoint(&self, endpoint: &Endpoint) -> InventoryResult<()> {
        self.put(ENDPOINTS, &endpoint.id, endpoint)
    }

    pub fn put_ethernet_switch_port(&self, port: &EthernetSwitchPort) -> InventoryResult<()> {
        self.put(ETHERNET_SWITCH_PORTS, &port.id, port)
    }

    pub fn put_volume(&self, volume: &Volume) -> InventoryResult<()> {
        self.put(VOLUMES, &volume.id, volume)
    }

    pub fn put_storage_pool(&self, pool: &StoragePool) -> InventoryResult<()> {
        self.put(STORAGE_POOLS, &pool.id, pool)
    }

    /// Fetch a system, failing with `NotFound` if it is absent.
    pub fn require_system(&self, id: &ResourceId) -> InventoryResult<ComputerSystem> {
        self.computer_system(id)?.ok_or_else(|| InventoryError::NotFound {
            kind: ResourceKind::ComputerSystem.collection(),
            id: id.clone(),
        })
    }
}

fn insert<T: Serialize>(
    txn: &WriteTransaction,
    definition: Table,
    key: &ResourceId,
    value: &T,
) -> InventoryResult<()> {
    let value = serde_json::to_vec(value).map_err(|e| write_error(definition, key, e))?;
    let mut table = txn.open_table(definition).map_err(map_err!(Table, definition))?;
    table
        .insert(key.as_str(), value.as_slice())
        .map_err(|e| write_error(definition, key, e))?;
    Ok(())
}

fn write_error(definition: Table, key: &ResourceId, reason: impl std::fmt::Display) -> InventoryError {
    InventoryError::Write {
        table: definition.name().to_string(),
        key: key.clone(),
        reason: reason.to_string(),
    }
}

impl Inventory for InventoryStore {
    fn computer_system(&self, id: &ResourceId) -> InventoryResult<Option<ComputerSystem>> {
        self.get(SYSTEMS, id)
    }

    fn computer_systems(&self) -> InventoryResult<Vec<ComputerSystem>> {
        self.list(SYSTEMS)
    }

    fn chassis(&self, id: &ResourceId) -> InventoryResult<Option<Chassis>> {
        self.get(CHASSIS, id)
    }

    fn drive(&self, id: &ResourceId) -> InventoryResult<Option<Drive>> {
        self.get(DRIVES, id)
    }

    fn fabric_processor(&self, id: &ResourceId) -> InventoryResult<Option<Processor>> {
        self.get(PROCESSORS, id)
    }

    fn fabric_processors(&self) -> InventoryResult<Vec<Processor>> {
        self.list(PROCESSORS)
    }

    fn switch(&self, id: &ResourceId) -> InventoryResult<Option<Switch>> {
        self.get(SWITCHES, id)
    }

    fn port(&self, id: &ResourceId) -> InventoryResult<Option<Port>> {
        self.get(PORTS, id)
    }

    fn ports(&self) -> InventoryResult<Vec<Port>> {
        self.list(PORTS)
    }

    fn endpoint(&self, id: &ResourceId) -> InventoryResult<Option<Endpoint>> {
        self.get(ENDPOINTS, id)
    }

    fn volume(&self, id: &ResourceId) -> InventoryResult<Option<Volume>> {
        self.get(VOLUMES, id)
    }

    fn ethernet_switch_ports(&self) -> InventoryResult<Vec<EthernetSwitchPort>> {
        self.list(ETHERNET_SWITCH_PORTS)
    }

    fn storage_pools(&self) -> InventoryResult<Vec<StoragePool>> {
        self.list(STORAGE_POOLS)
    }
}
