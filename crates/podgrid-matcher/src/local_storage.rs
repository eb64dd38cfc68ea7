//! Unified view of every drive a system could use locally.
//!
//! A system reaches drives three ways: devices of its simple-storage
//! subsystems, drives owned by its storage controllers, and drives behind
//! a PCIe switch its connection ids are cabled to. [`LocalStorageCollector`]
//! flattens all three into [`LocalStorage`] entries, one per drive id.

use std::collections::BTreeSet;

use tracing::debug;

use pod_core::{MediaType, Protocol, ResourceId};
use podgrid_inventory::{ComputerSystem, Drive, Inventory, SimpleStorageDevice};

use crate::chassis::ChassisCollector;
use crate::error::MatchResult;
use crate::mappers::{ChassisScopes, LocalDriveMapper, ResourceMapper};
use crate::request::RequestedLocalDrive;

/// A drive as seen by the matcher, independent of how it is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalStorage {
    /// Identifier of the underlying drive or simple-storage device.
    pub id: ResourceId,
    pub chassis: Option<ResourceId>,
    pub capacity_gib: Option<f64>,
    pub media_type: Option<MediaType>,
    pub protocol: Option<Protocol>,
    pub rotation_speed_rpm: Option<u32>,
    pub serial_number: Option<String>,
    pub from_fabric_switch: bool,
    /// Set for fabric drives that still hold data; such a drive is only
    /// handed out when a request names it.
    pub requires_explicit_selection: bool,
}

impl LocalStorage {
    fn from_device(device: &SimpleStorageDevice, chassis: Option<&ResourceId>) -> Self {
        LocalStorage {
            id: device.id.clone(),
            chassis: chassis.cloned(),
            capacity_gib: device.capacity_bytes.map(pod_core::units::bytes_to_gib),
            media_type: None,
            protocol: None,
            rotation_speed_rpm: None,
            serial_number: None,
            from_fabric_switch: false,
            requires_explicit_selection: false,
        }
    }

    fn from_drive(drive: &Drive, from_fabric_switch: bool, requires_explicit_selection: bool) -> Self {
        LocalStorage {
            id: drive.id.clone(),
            chassis: drive.chassis.clone(),
            capacity_gib: drive.capacity_gib(),
            media_type: drive.media_type,
            protocol: drive.protocol,
            rotation_speed_rpm: drive.rotation_speed_rpm,
            serial_number: drive.serial_number.clone(),
            from_fabric_switch,
            requires_explicit_selection,
        }
    }
}

pub struct LocalStorageCollector<'a> {
    inventory: &'a dyn Inventory,
    require_explicit_fabric_selection: bool,
}

impl<'a> LocalStorageCollector<'a> {
    pub fn new(inventory: &'a dyn Inventory, require_explicit_fabric_selection: bool) -> Self {
        Self {
            inventory,
            require_explicit_fabric_selection,
        }
    }

    /// Every drive the system can use, de-duplicated by drive id. The first
    /// source to report a drive wins.
    pub fn collect(&self, system: &ComputerSystem) -> MatchResult<Vec<LocalStorage>> {
        let mut seen = BTreeSet::new();
        let mut storage = Vec::new();
        let mut push = |entry: LocalStorage| {
            if seen.insert(entry.id.clone()) {
                storage.push(entry);
            }
        };

        for device in system.simple_storages.iter().flat_map(|s| s.devices.iter()) {
            push(LocalStorage::from_device(device, system.chassis.first()));
        }

        for drive_id in system.storage_drive_ids() {
            match self.inventory.drive(drive_id)? {
                Some(drive) if drive.achievable => push(LocalStorage::from_drive(&drive, false, false)),
                Some(_) => {}
                None => debug!(system = %system.id, drive = %drive_id, "controller drive missing from inventory"),
            }
        }

        for drive in self.pcie_drives(system)? {
            let explicit = self.require_explicit_fabric_selection && drive.drive_erased != Some(true);
            push(LocalStorage::from_drive(&drive, true, explicit));
        }

        debug!(system = %system.id, drives = storage.len(), "local storage collected");
        Ok(storage)
    }

    fn pcie_drives(&self, system: &ComputerSystem) -> MatchResult<Vec<Drive>> {
        let mut drives = Vec::new();
        for port in self
            .inventory
            .upstream_ports_by_connection_ids(&system.pcie_connection_ids)?
        {
            drives.extend(self.inventory.achievable_pcie_drives(&port)?);
        }
        Ok(drives)
    }
}

pub struct LocalStorageMatcher<'a> {
    collector: LocalStorageCollector<'a>,
}

impl<'a> LocalStorageMatcher<'a> {
    pub fn new(collector: LocalStorageCollector<'a>) -> Self {
        Self { collector }
    }

    pub fn matches(&self, requested: &[RequestedLocalDrive], system: &ComputerSystem) -> MatchResult<bool> {
        if requested.is_empty() {
            return Ok(true);
        }
        let mapper = LocalDriveMapper::new(self.chassis_scopes(requested)?);
        let available = self.collector.collect(system)?;
        Ok(mapper.saturates(requested, &available))
    }

    /// Each requested drive chassis with the ids of everything it contains.
    fn chassis_scopes(&self, requested: &[RequestedLocalDrive]) -> MatchResult<ChassisScopes> {
        let ids: BTreeSet<ResourceId> = requested.iter().filter_map(|d| d.chassis.clone()).collect();
        let mut scopes = ChassisScopes::new();
        for chassis in ChassisCollector::new(self.collector.inventory).find_chassis_by_ids(&ids)? {
            let scope = self
                .collector
                .inventory
                .chassis_subtree(&chassis)?
                .into_iter()
                .map(|c| c.id)
                .collect();
            scopes.insert(chassis.id, scope);
        }
        Ok(scopes)
    }
}
