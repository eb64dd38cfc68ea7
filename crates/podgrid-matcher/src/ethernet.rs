//! Ethernet interface saturation and the RDMA side-constraint.

use std::collections::BTreeSet;

use tracing::debug;

use pod_core::{EntityType, Protocol, ResourceId, ResourceKind};
use podgrid_inventory::{ComputerSystem, Inventory};

use crate::error::{MatchError, MatchResult};
use crate::mappers::{EthernetInterfaceMapper, ResourceMapper};
use crate::request::{RequestedEthernetInterface, RequestedRemoteDrive};

pub struct EthernetInterfaceMatcher<'a> {
    inventory: &'a dyn Inventory,
    rdma_protocols: &'a [Protocol],
}

impl<'a> EthernetInterfaceMatcher<'a> {
    pub fn new(inventory: &'a dyn Inventory, rdma_protocols: &'a [Protocol]) -> Self {
        Self {
            inventory,
            rdma_protocols,
        }
    }

    /// Whether any requested remote drive will be reached over
    /// NVMe-over-Fabrics, either by its own protocol or by the protocol of
    /// the fabric resource it references.
    pub fn requires_rdma(&self, remote_drives: &[RequestedRemoteDrive]) -> MatchResult<bool> {
        for drive in remote_drives {
            if self.remote_drive_protocols(drive)?.contains(&Protocol::NvmeOverFabrics) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn remote_drive_protocols(&self, drive: &RequestedRemoteDrive) -> MatchResult<BTreeSet<Protocol>> {
        if let Some(protocol) = drive.protocol {
            return Ok(BTreeSet::from([protocol]));
        }
        let Some(resource) = &drive.resource else {
            return Ok(BTreeSet::new());
        };

        match resource.kind() {
            Ok(ResourceKind::Endpoint) => {
                let endpoint = self
                    .inventory
                    .endpoint(resource)?
                    .ok_or_else(|| MatchError::unresolvable(ResourceKind::Endpoint.collection(), resource))?;
                let mut protocols = BTreeSet::new();
                for volume_id in endpoint.entities_of_type(EntityType::Volume) {
                    if let Some(volume) = self.inventory.volume(volume_id)? {
                        protocols.extend(volume.protocol);
                    }
                }
                Ok(protocols)
            }
            Ok(ResourceKind::Volume) => {
                let volume = self
                    .inventory
                    .volume(resource)?
                    .ok_or_else(|| MatchError::unresolvable(ResourceKind::Volume.collection(), resource))?;
                Ok(volume.protocol.into_iter().collect())
            }
            _ => Err(MatchError::unresolvable("fabric resource", resource)),
        }
    }

    pub fn matches(
        &self,
        requested: &[RequestedEthernetInterface],
        requires_rdma: bool,
        system: &ComputerSystem,
    ) -> MatchResult<bool> {
        if !requested.is_empty() {
            let mapper = EthernetInterfaceMapper::new(self.linked_interfaces(requested, system)?);
            if !mapper.saturates(requested, &system.ethernet_interfaces) {
                return Ok(false);
            }
        }
        if requires_rdma && !self.has_rdma_interface(system) {
            debug!(system = %system.id, "no RDMA-capable interface for NVMe-oF drive");
            return Ok(false);
        }
        Ok(true)
    }

    /// Interfaces whose MAC is the neighbor of exactly one enabled, healthy
    /// switch port. Only looked up when some request carries VLANs.
    fn linked_interfaces(
        &self,
        requested: &[RequestedEthernetInterface],
        system: &ComputerSystem,
    ) -> MatchResult<BTreeSet<ResourceId>> {
        let mut linked = BTreeSet::new();
        if requested.iter().all(|r| r.vlans.is_empty()) {
            return Ok(linked);
        }
        for nic in &system.ethernet_interfaces {
            let Some(mac) = nic.mac_address.as_deref() else { continue };
            match self.inventory.switch_ports_by_neighbor_mac(mac)?.len() {
                1 => {
                    linked.insert(nic.id.clone());
                }
                0 => {}
                n => debug!(interface = %nic.id, ports = n, "neighbor MAC is not unique"),
            }
        }
        Ok(linked)
    }

    fn has_rdma_interface(&self, system: &ComputerSystem) -> bool {
        system
            .ethernet_interfaces
            .iter()
            .flat_map(|nic| nic.supported_protocols.iter())
            .any(|p| self.rdma_protocols.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_core::EntityRole;
    use podgrid_inventory::{
        ConnectedEntity, Endpoint, EthernetInterface, EthernetSwitchPort, InventoryDocument, InventoryStore,
        Volume,
    };

    fn make_system(protocols: Vec<Protocol>) -> ComputerSystem {
        let mut system: ComputerSystem =
            serde_json::from_str(r#"{"id": "/redfish/v1/Systems/1"}"#).unwrap();
        system.ethernet_interfaces = vec![EthernetInterface {
            id: "/redfish/v1/Systems/1/EthernetInterfaces/1".into(),
            speed_mbps: Some(25_000),
            supported_protocols: protocols,
            mac_address: Some("00:1e:67:00:00:01".to_string()),
            chassis: None,
        }];
        system
    }

    fn nvmeof_drive() -> RequestedRemoteDrive {
        RequestedRemoteDrive {
            capacity_gib: Some(100.0),
            protocol: Some(Protocol::NvmeOverFabrics),
            resource: None,
        }
    }

    fn make_store() -> InventoryStore {
        let store = InventoryStore::open_in_memory().unwrap();
        store
            .import(&InventoryDocument {
                volumes: vec![Volume {
                    id: "/redfish/v1/StorageServices/1/Volumes/1".into(),
                    capacity_bytes: None,
                    protocol: Some(Protocol::NvmeOverFabrics),
                    storage_pool: None,
                }],
                endpoints: vec![Endpoint {
                    id: "/redfish/v1/Fabrics/NVMe/Endpoints/target".into(),
                    protocol: Some(Protocol::NvmeOverFabrics),
                    connected_entities: vec![ConnectedEntity {
                        entity: Some("/redfish/v1/StorageServices/1/Volumes/1".into()),
                        entity_type: Some(EntityType::Volume),
                        role: Some(EntityRole::Target),
                    }],
                    ports: vec![],
                    achievable: true,
                    allocated: false,
                }],
                ..Default::default()
            })
            .unwrap();
        store
    }

    #[test]
    fn nvmeof_needs_rdma_interface() {
        let store = InventoryStore::open_in_memory().unwrap();
        let matcher = EthernetInterfaceMatcher::new(&store, &Protocol::DEFAULT_RDMA);
        let requires = matcher.requires_rdma(&[nvmeof_drive()]).unwrap();
        assert!(requires);

        assert!(!matcher.matches(&[], requires, &make_system(vec![Protocol::Iwarp])).unwrap());
        assert!(matcher.matches(&[], requires, &make_system(vec![Protocol::RoceV2])).unwrap());
    }

    #[test]
    fn configured_rdma_protocols_are_honored() {
        let store = InventoryStore::open_in_memory().unwrap();
        let rdma = [Protocol::Iwarp];
        let matcher = EthernetInterfaceMatcher::new(&store, &rdma);
        assert!(matcher.matches(&[], true, &make_system(vec![Protocol::Iwarp])).unwrap());
        assert!(!matcher.matches(&[], true, &make_system(vec![Protocol::RoceV2])).unwrap());
    }

    #[test]
    fn protocol_resolved_through_endpoint_volumes() {
        let store = make_store();
        let matcher = EthernetInterfaceMatcher::new(&store, &Protocol::DEFAULT_RDMA);
        let via_endpoint = RequestedRemoteDrive {
            resource: Some("/redfish/v1/Fabrics/NVMe/Endpoints/target".into()),
            ..Default::default()
        };
        let via_volume = RequestedRemoteDrive {
            resource: Some("/redfish/v1/StorageServices/1/Volumes/1".into()),
            ..Default::default()
        };
        assert!(matcher.requires_rdma(&[via_endpoint]).unwrap());
        assert!(matcher.requires_rdma(&[via_volume]).unwrap());
    }

    #[test]
    fn iscsi_drive_needs_no_rdma() {
        let store = InventoryStore::open_in_memory().unwrap();
        let matcher = EthernetInterfaceMatcher::new(&store, &Protocol::DEFAULT_RDMA);
        let iscsi = RequestedRemoteDrive {
            protocol: Some(Protocol::Iscsi),
            ..Default::default()
        };
        assert!(!matcher.requires_rdma(&[iscsi]).unwrap());
        assert!(!matcher.requires_rdma(&[]).unwrap());
    }

    #[test]
    fn unknown_fabric_reference_is_unresolvable() {
        let store = InventoryStore::open_in_memory().unwrap();
        let matcher = EthernetInterfaceMatcher::new(&store, &Protocol::DEFAULT_RDMA);
        let missing = RequestedRemoteDrive {
            resource: Some("/redfish/v1/StorageServices/1/Volumes/404".into()),
            ..Default::default()
        };
        let err = matcher.requires_rdma(&[missing]).unwrap_err();
        assert!(matches!(
            err,
            MatchError::UnresolvableReference { id, .. } if id == ResourceId::new("/redfish/v1/StorageServices/1/Volumes/404")
        ));
    }

    #[test]
    fn requested_interfaces_must_saturate() {
        let store = InventoryStore::open_in_memory().unwrap();
        let matcher = EthernetInterfaceMatcher::new(&store, &Protocol::DEFAULT_RDMA);
        let nic = RequestedEthernetInterface {
            speed_mbps: Some(10_000),
            ..Default::default()
        };
        let system = make_system(vec![]);
        assert!(matcher.matches(std::slice::from_ref(&nic), false, &system).unwrap());
        assert!(!matcher.matches(&[nic.clone(), nic], false, &system).unwrap());
    }

    fn switch_ports(neighbors: &[&str]) -> InventoryStore {
        let store = InventoryStore::open_in_memory().unwrap();
        let ports = neighbors
            .iter()
            .enumerate()
            .map(|(n, mac)| EthernetSwitchPort {
                id: format!("/redfish/v1/EthernetSwitches/1/Ports/{n}").into(),
                neighbor_mac: Some(mac.to_string()),
                status: Default::default(),
            })
            .collect();
        store
            .import(&InventoryDocument {
                ethernet_switch_ports: ports,
                ..Default::default()
            })
            .unwrap();
        store
    }

    fn tagged() -> RequestedEthernetInterface {
        RequestedEthernetInterface {
            vlans: vec![100],
            resource: Some("/redfish/v1/Systems/1/EthernetInterfaces/1".into()),
            ..Default::default()
        }
    }

    #[test]
    fn vlans_need_interface_cabled_to_one_switch_port() {
        let store = switch_ports(&["00:1E:67:00:00:01"]);
        let matcher = EthernetInterfaceMatcher::new(&store, &Protocol::DEFAULT_RDMA);
        assert!(matcher.matches(&[tagged()], false, &make_system(vec![])).unwrap());
    }

    #[test]
    fn vlans_rejected_when_neighbor_mac_is_ambiguous() {
        let store = switch_ports(&["00:1e:67:00:00:01", "00:1e:67:00:00:01"]);
        let matcher = EthernetInterfaceMatcher::new(&store, &Protocol::DEFAULT_RDMA);
        let system = make_system(vec![]);
        assert!(!matcher.matches(&[tagged()], false, &system).unwrap());

        let untagged = RequestedEthernetInterface {
            resource: Some("/redfish/v1/Systems/1/EthernetInterfaces/1".into()),
            ..Default::default()
        };
        assert!(matcher.matches(&[untagged], false, &system).unwrap());
    }

    #[test]
    fn vlans_rejected_without_switch_port() {
        let store = switch_ports(&["00:1e:67:00:00:02"]);
        let matcher = EthernetInterfaceMatcher::new(&store, &Protocol::DEFAULT_RDMA);
        assert!(!matcher.matches(&[tagged()], false, &make_system(vec![])).unwrap());
    }
}
