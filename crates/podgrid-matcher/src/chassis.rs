//! Chassis resolution and chassis-scoped system lookups.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use pod_core::{ResourceId, ResourceKind};
use podgrid_inventory::{Chassis, Drive, Inventory};

use crate::error::{MatchError, MatchResult};

pub struct ChassisCollector<'a> {
    inventory: &'a dyn Inventory,
}

impl<'a> ChassisCollector<'a> {
    pub fn new(inventory: &'a dyn Inventory) -> Self {
        Self { inventory }
    }

    /// Resolve every id, failing on the first one missing from inventory.
    pub fn find_chassis_by_ids(&self, ids: &BTreeSet<ResourceId>) -> MatchResult<Vec<Chassis>> {
        ids.iter()
            .map(|id| {
                self.inventory
                    .chassis(id)?
                    .ok_or_else(|| MatchError::unresolvable(ResourceKind::Chassis.collection(), id))
            })
            .collect()
    }

    /// Drives transitively contained by the given chassis.
    pub fn local_drives_from_chassis_ids(&self, ids: &BTreeSet<ResourceId>) -> MatchResult<Vec<Drive>> {
        let mut drives = BTreeMap::new();
        for chassis in self.find_chassis_by_ids(ids)? {
            for drive in self.inventory.drives_under_chassis(&chassis)? {
                drives.insert(drive.id.clone(), drive);
            }
        }
        Ok(drives.into_values().collect())
    }

    /// Systems that sit under every requested chassis and, for local-drive
    /// chassis, can reach the drives housed there.
    ///
    /// Each chassis contributes the systems beneath it; a chassis with no
    /// systems contributes an empty set and empties the result. Drive-derived
    /// sets are only intersected when non-empty.
    pub fn common_systems_by_chassis_ids(
        &self,
        chassis_ids: &BTreeSet<ResourceId>,
        local_drive_chassis_ids: &BTreeSet<ResourceId>,
    ) -> MatchResult<BTreeSet<ResourceId>> {
        let mut sets = Vec::new();
        for chassis in self.find_chassis_by_ids(chassis_ids)? {
            sets.push(self.inventory.systems_under_chassis(&chassis)?);
        }

        if !local_drive_chassis_ids.is_empty() {
            let drives = self.local_drives_from_chassis_ids(local_drive_chassis_ids)?;
            let (nvme, other): (Vec<_>, Vec<_>) = drives.into_iter().partition(Drive::is_nvme);

            let owners: BTreeSet<ResourceId> = other.into_iter().filter_map(|d| d.system).collect();
            let fabric = self.systems_reaching_nvme_drives(&nvme)?;
            sets.extend([owners, fabric].into_iter().filter(|s| !s.is_empty()));
        }

        let mut sets = sets.into_iter();
        let Some(mut common) = sets.next() else {
            return Ok(BTreeSet::new());
        };
        for set in sets {
            common.retain(|id| set.contains(id));
        }
        debug!(chassis = chassis_ids.len(), systems = common.len(), "common chassis systems");
        Ok(common)
    }

    /// Allocatable systems cabled to a PCIe switch in the chassis of any of
    /// the given NVMe drives.
    fn systems_reaching_nvme_drives(&self, drives: &[Drive]) -> MatchResult<BTreeSet<ResourceId>> {
        let chassis_ids: BTreeSet<ResourceId> = drives.iter().filter_map(|d| d.chassis.clone()).collect();
        if chassis_ids.is_empty() {
            return Ok(BTreeSet::new());
        }
        let systems = self.inventory.systems_possible_to_allocate()?;
        let mut reaching = BTreeSet::new();
        for chassis_id in &chassis_ids {
            let Some(chassis) = self.inventory.chassis(chassis_id)? else { continue };
            for port in self.inventory.pcie_upstream_ports_of_chassis(&chassis)? {
                reaching.extend(
                    systems
                        .iter()
                        .filter(|s| s.shares_pcie_connection(&port.pcie_connection_ids))
                        .map(|s| s.id.clone()),
                );
            }
        }
        Ok(reaching)
    }
}
