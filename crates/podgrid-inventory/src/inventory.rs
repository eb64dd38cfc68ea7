//! The read-only inventory contract consumed by the matching engine.
//!
//! Implementors supply primitive lookups; the fabric-topology and
//! chassis-containment queries are provided on top of them so every backend
//! walks the topology the same way.

use std::collections::{BTreeMap, BTreeSet};

use pod_core::{EntityType, ResourceId};

use crate::error::InventoryResult;
use crate::types::*;

pub trait Inventory {
    fn computer_system(&self, id: &ResourceId) -> InventoryResult<Option<ComputerSystem>>;
    fn computer_systems(&self) -> InventoryResult<Vec<ComputerSystem>>;
    fn chassis(&self, id: &ResourceId) -> InventoryResult<Option<Chassis>>;
    fn drive(&self, id: &ResourceId) -> InventoryResult<Option<Drive>>;
    fn fabric_processor(&self, id: &ResourceId) -> InventoryResult<Option<Processor>>;
    fn fabric_processors(&self) -> InventoryResult<Vec<Processor>>;
    fn switch(&self, id: &ResourceId) -> InventoryResult<Option<Switch>>;
    fn port(&self, id: &ResourceId) -> InventoryResult<Option<Port>>;
    fn ports(&self) -> InventoryResult<Vec<Port>>;
    fn endpoint(&self, id: &ResourceId) -> InventoryResult<Option<Endpoint>>;
    fn volume(&self, id: &ResourceId) -> InventoryResult<Option<Volume>>;
    fn storage_pools(&self) -> InventoryResult<Vec<StoragePool>>;
    fn ethernet_switch_ports(&self) -> InventoryResult<Vec<EthernetSwitchPort>>;

    /// Enabled and healthy switch ports whose neighbor is the given MAC. A
    /// cabled interface resolves to exactly one.
    fn switch_ports_by_neighbor_mac(&self, mac: &str) -> InventoryResult<Vec<EthernetSwitchPort>> {
        Ok(self
            .ethernet_switch_ports()?
            .into_iter()
            .filter(|p| p.status.is_enabled_and_healthy() && p.has_neighbor(mac))
            .collect())
    }

    /// Systems not yet backing a composed node.
    fn systems_possible_to_allocate(&self) -> InventoryResult<Vec<ComputerSystem>> {
        Ok(self
            .computer_systems()?
            .into_iter()
            .filter(|s| !s.allocated)
            .collect())
    }

    /// Upstream switch ports cabled to any of the given PCIe connection ids.
    fn upstream_ports_by_connection_ids(&self, connection_ids: &[String]) -> InventoryResult<Vec<Port>> {
        if connection_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .ports()?
            .into_iter()
            .filter(|p| p.is_upstream())
            .filter(|p| p.pcie_connection_ids.iter().any(|c| connection_ids.contains(c)))
            .collect())
    }

    /// Endpoints behind the downstream ports of the switch owning `upstream`.
    fn downstream_endpoints(&self, upstream: &Port) -> InventoryResult<Vec<Endpoint>> {
        let Some(switch) = self.switch(&upstream.switch)? else {
            return Ok(Vec::new());
        };
        let mut endpoints = BTreeMap::new();
        for port_id in &switch.ports {
            let Some(port) = self.port(port_id)? else { continue };
            if !port.is_downstream() {
                continue;
            }
            for endpoint_id in &port.endpoints {
                if let Some(endpoint) = self.endpoint(endpoint_id)? {
                    endpoints.insert(endpoint.id.clone(), endpoint);
                }
            }
        }
        Ok(endpoints.into_values().collect())
    }

    /// Unallocated, achievable drives reachable through `upstream`.
    fn achievable_pcie_drives(&self, upstream: &Port) -> InventoryResult<Vec<Drive>> {
        let mut drives = BTreeMap::new();
        for endpoint in self.downstream_endpoints(upstream)? {
            for drive_id in endpoint.entities_of_type(EntityType::Drive) {
                if let Some(drive) = self.drive(drive_id)? {
                    if drive.achievable && !drive.allocated {
                        drives.insert(drive.id.clone(), drive);
                    }
                }
            }
        }
        Ok(drives.into_values().collect())
    }

    /// Unallocated, achievable processors reachable through `upstream`. A
    /// processor exposed by endpoints needs at least one attachable endpoint.
    fn achievable_pcie_processors(&self, upstream: &Port) -> InventoryResult<Vec<Processor>> {
        let mut processors = BTreeMap::new();
        for endpoint in self.downstream_endpoints(upstream)? {
            for processor_id in endpoint.entities_of_type(EntityType::Processor) {
                let Some(processor) = self.fabric_processor(processor_id)? else { continue };
                if !processor.achievable || processor.allocated {
                    continue;
                }
                if self.has_attachable_endpoint(&processor)? {
                    processors.insert(processor.id.clone(), processor);
                }
            }
        }
        Ok(processors.into_values().collect())
    }

    fn has_attachable_endpoint(&self, processor: &Processor) -> InventoryResult<bool> {
        if processor.endpoints.is_empty() {
            return Ok(true);
        }
        for endpoint_id in &processor.endpoints {
            if let Some(endpoint) = self.endpoint(endpoint_id)? {
                if endpoint.is_attachable() {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// The chassis itself followed by every chassis it transitively contains.
    fn chassis_subtree(&self, root: &Chassis) -> InventoryResult<Vec<Chassis>> {
        let mut visited = BTreeSet::from([root.id.clone()]);
        let mut subtree = vec![root.clone()];
        let mut cursor = 0;
        while cursor < subtree.len() {
            let children = subtree[cursor].contains.clone();
            cursor += 1;
            for child_id in children {
                if !visited.insert(child_id.clone()) {
                    continue;
                }
                if let Some(child) = self.chassis(&child_id)? {
                    subtree.push(child);
                }
            }
        }
        Ok(subtree)
    }

    fn systems_under_chassis(&self, chassis: &Chassis) -> InventoryResult<BTreeSet<ResourceId>> {
        Ok(self
            .chassis_subtree(chassis)?
            .into_iter()
            .flat_map(|c| c.computer_systems)
            .collect())
    }

    fn drives_under_chassis(&self, chassis: &Chassis) -> InventoryResult<Vec<Drive>> {
        let mut drives = BTreeMap::new();
        for member in self.chassis_subtree(chassis)? {
            for drive_id in &member.drives {
                if let Some(drive) = self.drive(drive_id)? {
                    drives.insert(drive.id.clone(), drive);
                }
            }
        }
        Ok(drives.into_values().collect())
    }

    /// Upstream ports of the PCIe switches housed in the given chassis.
    fn pcie_upstream_ports_of_chassis(&self, chassis: &Chassis) -> InventoryResult<Vec<Port>> {
        let mut ports = Vec::new();
        for switch_id in &chassis.switches {
            let Some(switch) = self.switch(switch_id)? else { continue };
            if !switch.is_pcie() {
                continue;
            }
            for port_id in &switch.ports {
                if let Some(port) = self.port(port_id)? {
                    if port.is_upstream() {
                        ports.push(port);
                    }
                }
            }
        }
        Ok(ports)
    }
}
