//! Per-resource compatibility rules.
//!
//! A mapper decides whether one available item can serve one requested
//! item; the assignment over whole lists is the bipartite search in
//! [`crate::bipartite`]. An unset requested attribute is unconstrained, a
//! set requested attribute against an unset available one is not satisfied.
//!
//! The `chassis` of requested processors, memory and interfaces scopes the
//! system, which the chassis stage enforces; only local drives check their
//! own chassis, by containment.

use std::collections::{BTreeMap, BTreeSet};

use pod_core::ResourceId;
use podgrid_inventory::{EthernetInterface, Memory, Processor};

use crate::bipartite;
use crate::local_storage::LocalStorage;
use crate::request::{RequestedEthernetInterface, RequestedLocalDrive, RequestedMemory, RequestedProcessor};

pub trait ResourceMapper {
    type Requested;
    type Available;

    fn compatible(&self, requested: &Self::Requested, available: &Self::Available) -> bool;

    /// Assign each requested item a distinct compatible available item,
    /// maximizing the number of assigned requests.
    fn map_requested_to_available<'a>(
        &self,
        requested: &[Self::Requested],
        available: &'a [Self::Available],
    ) -> Vec<Option<&'a Self::Available>> {
        bipartite::maximum_assignment(requested.len(), available.len(), |r, a| {
            self.compatible(&requested[r], &available[a])
        })
        .into_iter()
        .map(|slot| slot.map(|a| &available[a]))
        .collect()
    }

    /// Whether every requested item gets its own compatible available item.
    fn saturates(&self, requested: &[Self::Requested], available: &[Self::Available]) -> bool {
        bipartite::is_saturating(requested.len(), available.len(), |r, a| {
            self.compatible(&requested[r], &available[a])
        })
    }
}

fn exact<T: PartialEq>(requested: Option<&T>, available: Option<&T>) -> bool {
    requested.is_none_or(|r| available == Some(r))
}

fn at_least<T: PartialOrd>(requested: Option<T>, available: Option<T>) -> bool {
    match (requested, available) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(r), Some(a)) => a >= r,
    }
}

fn same_resource(requested: Option<&ResourceId>, available: &ResourceId) -> bool {
    requested.is_none_or(|r| r == available)
}

/// Requested chassis id mapped to every chassis id it transitively contains.
pub type ChassisScopes = BTreeMap<ResourceId, BTreeSet<ResourceId>>;

fn within(requested: Option<&ResourceId>, available: Option<&ResourceId>, scopes: &ChassisScopes) -> bool {
    match (requested, available) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(r), Some(a)) => a == r || scopes.get(r).is_some_and(|scope| scope.contains(a)),
    }
}

pub struct ProcessorMapper;

impl ResourceMapper for ProcessorMapper {
    type Requested = RequestedProcessor;
    type Available = Processor;

    fn compatible(&self, requested: &RequestedProcessor, available: &Processor) -> bool {
        exact(requested.model.as_ref(), available.model.as_ref())
            && exact(requested.brand.as_ref(), available.brand.as_ref())
            && exact(requested.instruction_set.as_ref(), available.instruction_set.as_ref())
            && exact(requested.processor_type.as_ref(), available.processor_type.as_ref())
            && at_least(requested.total_cores, available.total_cores)
            && at_least(requested.achievable_speed_mhz, available.max_speed_mhz)
            && same_resource(requested.resource.as_ref(), &available.id)
    }
}

pub struct MemoryMapper;

impl ResourceMapper for MemoryMapper {
    type Requested = RequestedMemory;
    type Available = Memory;

    fn compatible(&self, requested: &RequestedMemory, available: &Memory) -> bool {
        exact(requested.memory_device_type.as_ref(), available.memory_device_type.as_ref())
            && at_least(requested.speed_mhz, available.operating_speed_mhz)
            && at_least(requested.data_width_bits, available.data_width_bits)
            && at_least(requested.capacity_mib, available.capacity_mib)
            && exact(requested.manufacturer.as_ref(), available.manufacturer.as_ref())
            && same_resource(requested.resource.as_ref(), &available.id)
    }
}

#[derive(Debug, Default)]
pub struct LocalDriveMapper {
    scopes: ChassisScopes,
}

impl LocalDriveMapper {
    pub fn new(scopes: ChassisScopes) -> Self {
        Self { scopes }
    }
}

impl ResourceMapper for LocalDriveMapper {
    type Requested = RequestedLocalDrive;
    type Available = LocalStorage;

    fn compatible(&self, requested: &RequestedLocalDrive, available: &LocalStorage) -> bool {
        if available.requires_explicit_selection && requested.resource.as_ref() != Some(&available.id) {
            return false;
        }
        at_least(requested.capacity_gib, available.capacity_gib)
            && exact(requested.media_type.as_ref(), available.media_type.as_ref())
            && exact(requested.protocol.as_ref(), available.protocol.as_ref())
            && at_least(requested.min_rpm, available.rotation_speed_rpm)
            && exact(requested.serial_number.as_ref(), available.serial_number.as_ref())
            && same_resource(requested.resource.as_ref(), &available.id)
            && within(requested.chassis.as_ref(), available.chassis.as_ref(), &self.scopes)
            && requested.fabric_switch.is_none_or(|f| f == available.from_fabric_switch)
    }
}

#[derive(Debug, Default)]
pub struct EthernetInterfaceMapper {
    /// Interfaces cabled to exactly one enabled, healthy switch port.
    linked: BTreeSet<ResourceId>,
}

impl EthernetInterfaceMapper {
    pub fn new(linked: BTreeSet<ResourceId>) -> Self {
        Self { linked }
    }
}

impl ResourceMapper for EthernetInterfaceMapper {
    type Requested = RequestedEthernetInterface;
    type Available = EthernetInterface;

    fn compatible(&self, requested: &RequestedEthernetInterface, available: &EthernetInterface) -> bool {
        // VLANs are configured on the switch port the interface is cabled to.
        if !requested.vlans.is_empty() && !self.linked.contains(&available.id) {
            return false;
        }
        at_least(requested.speed_mbps, available.speed_mbps)
            && same_resource(requested.resource.as_ref(), &available.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_core::{MediaType, MemoryDeviceType, ProcessorType, Protocol};

    fn make_memory(id: &str, capacity_mib: Option<u64>) -> Memory {
        Memory {
            id: id.into(),
            capacity_mib,
            memory_device_type: Some(MemoryDeviceType::Ddr4),
            operating_speed_mhz: Some(2400),
            data_width_bits: Some(64),
            manufacturer: Some("Hynix".to_string()),
            chassis: None,
        }
    }

    fn make_nic(id: &str, speed_mbps: Option<u32>) -> EthernetInterface {
        EthernetInterface {
            id: id.into(),
            speed_mbps,
            supported_protocols: vec![],
            mac_address: None,
            chassis: None,
        }
    }

    fn make_drive(id: &str, explicit: bool) -> LocalStorage {
        LocalStorage {
            id: id.into(),
            chassis: Some("/redfish/v1/Chassis/jbof".into()),
            capacity_gib: Some(480.0),
            media_type: Some(MediaType::Ssd),
            protocol: Some(Protocol::Nvme),
            rotation_speed_rpm: None,
            serial_number: Some("SN-42".to_string()),
            from_fabric_switch: true,
            requires_explicit_selection: explicit,
        }
    }

    #[test]
    fn memory_thresholds_and_exact_fields() {
        let module = make_memory("/redfish/v1/Systems/1/Memory/1", Some(8192));
        let ok = RequestedMemory {
            capacity_mib: Some(4096),
            speed_mhz: Some(2133),
            data_width_bits: Some(64),
            memory_device_type: Some(MemoryDeviceType::Ddr4),
            manufacturer: Some("Hynix".to_string()),
            ..Default::default()
        };
        assert!(MemoryMapper.compatible(&ok, &module));

        let too_fast = RequestedMemory { speed_mhz: Some(3200), ..Default::default() };
        assert!(!MemoryMapper.compatible(&too_fast, &module));

        let wrong_type = RequestedMemory {
            memory_device_type: Some(MemoryDeviceType::Ddr3),
            ..Default::default()
        };
        assert!(!MemoryMapper.compatible(&wrong_type, &module));
    }

    #[test]
    fn set_request_against_unset_available_fails() {
        let module = make_memory("/redfish/v1/Systems/1/Memory/1", None);
        let request = RequestedMemory { capacity_mib: Some(1), ..Default::default() };
        assert!(!MemoryMapper.compatible(&request, &module));
        assert!(MemoryMapper.compatible(&RequestedMemory::default(), &module));
    }

    #[test]
    fn memory_saturation_needs_distinct_modules() {
        let available = vec![
            make_memory("/redfish/v1/Systems/1/Memory/1", Some(4096)),
            make_memory("/redfish/v1/Systems/1/Memory/2", Some(4096)),
            make_memory("/redfish/v1/Systems/1/Memory/3", Some(8192)),
        ];
        let requested = vec![
            RequestedMemory { capacity_mib: Some(4096), ..Default::default() },
            RequestedMemory { capacity_mib: Some(8192), ..Default::default() },
        ];
        let assignment = MemoryMapper.map_requested_to_available(&requested, &available);
        assert_eq!(assignment[1].map(|m| m.id.as_str()), Some("/redfish/v1/Systems/1/Memory/3"));
        assert!(assignment[0].is_some());
        assert!(MemoryMapper.saturates(&requested, &available));
        assert!(!MemoryMapper.saturates(&requested, &available[..2]));
    }

    #[test]
    fn processor_pinned_by_resource() {
        let processor: Processor = serde_json::from_value(serde_json::json!({
            "id": "/redfish/v1/Systems/1/Processors/2",
            "processor_type": "CPU",
            "total_cores": 16,
            "max_speed_mhz": 3000,
        }))
        .unwrap();

        let pinned = RequestedProcessor {
            resource: Some("/redfish/v1/Systems/1/Processors/2".into()),
            processor_type: Some(ProcessorType::Cpu),
            total_cores: Some(8),
            ..Default::default()
        };
        assert!(ProcessorMapper.compatible(&pinned, &processor));

        let other = RequestedProcessor {
            resource: Some("/redfish/v1/Systems/1/Processors/1".into()),
            ..Default::default()
        };
        assert!(!ProcessorMapper.compatible(&other, &processor));

        let fpga = RequestedProcessor {
            processor_type: Some(ProcessorType::Fpga),
            ..Default::default()
        };
        assert!(!ProcessorMapper.compatible(&fpga, &processor));
    }

    #[test]
    fn explicit_selection_drive_needs_its_id() {
        let mapper = LocalDriveMapper::default();
        let drive = make_drive("/redfish/v1/Chassis/jbof/Drives/1", true);
        assert!(!mapper.compatible(&RequestedLocalDrive::default(), &drive));

        let named = RequestedLocalDrive {
            resource: Some("/redfish/v1/Chassis/jbof/Drives/1".into()),
            ..Default::default()
        };
        assert!(mapper.compatible(&named, &drive));

        let erased = make_drive("/redfish/v1/Chassis/jbof/Drives/2", false);
        assert!(mapper.compatible(&RequestedLocalDrive::default(), &erased));
    }

    #[test]
    fn drive_fabric_flag_and_capacity() {
        let mapper = LocalDriveMapper::default();
        let drive = make_drive("/redfish/v1/Chassis/jbof/Drives/1", false);
        let local_only = RequestedLocalDrive { fabric_switch: Some(false), ..Default::default() };
        assert!(!mapper.compatible(&local_only, &drive));

        let big = RequestedLocalDrive { capacity_gib: Some(960.0), ..Default::default() };
        assert!(!mapper.compatible(&big, &drive));

        let hdd = RequestedLocalDrive { media_type: Some(MediaType::Hdd), ..Default::default() };
        assert!(!mapper.compatible(&hdd, &drive));
    }

    #[test]
    fn drive_chassis_matches_by_containment() {
        let drive = make_drive("/redfish/v1/Chassis/jbof/Drives/1", false);
        let in_rack = RequestedLocalDrive {
            chassis: Some("/redfish/v1/Chassis/rack".into()),
            ..Default::default()
        };
        let scopes = ChassisScopes::from([(
            "/redfish/v1/Chassis/rack".into(),
            BTreeSet::from(["/redfish/v1/Chassis/rack".into(), "/redfish/v1/Chassis/jbof".into()]),
        )]);
        assert!(LocalDriveMapper::new(scopes).compatible(&in_rack, &drive));
        assert!(!LocalDriveMapper::default().compatible(&in_rack, &drive));

        let own = RequestedLocalDrive {
            chassis: Some("/redfish/v1/Chassis/jbof".into()),
            ..Default::default()
        };
        assert!(LocalDriveMapper::default().compatible(&own, &drive));
    }

    #[test]
    fn processor_chassis_is_left_to_the_chassis_stage() {
        let processor: Processor = serde_json::from_value(serde_json::json!({
            "id": "/redfish/v1/Systems/1/Processors/1",
            "chassis": "/redfish/v1/Chassis/sled",
        }))
        .unwrap();
        let in_rack = RequestedProcessor {
            chassis: Some("/redfish/v1/Chassis/rack".into()),
            ..Default::default()
        };
        assert!(ProcessorMapper.compatible(&in_rack, &processor));

        let memory = make_memory("/redfish/v1/Systems/1/Memory/1", Some(4096));
        let memory_in_rack = RequestedMemory {
            chassis: Some("/redfish/v1/Chassis/rack".into()),
            ..Default::default()
        };
        assert!(MemoryMapper.compatible(&memory_in_rack, &memory));
    }

    #[test]
    fn ethernet_vlans_require_linked_port() {
        let unlinked = make_nic("/redfish/v1/Systems/1/EthernetInterfaces/1", Some(10_000));
        let linked = make_nic("/redfish/v1/Systems/1/EthernetInterfaces/2", Some(10_000));
        let mapper = EthernetInterfaceMapper::new(BTreeSet::from([linked.id.clone()]));
        let request = RequestedEthernetInterface {
            speed_mbps: Some(10_000),
            vlans: vec![100],
            ..Default::default()
        };
        assert!(!mapper.compatible(&request, &unlinked));
        assert!(mapper.compatible(&request, &linked));

        let untagged = RequestedEthernetInterface { speed_mbps: Some(10_000), ..Default::default() };
        assert!(mapper.compatible(&untagged, &unlinked));

        let faster = RequestedEthernetInterface { speed_mbps: Some(25_000), ..Default::default() };
        assert!(!mapper.compatible(&faster, &linked));
    }
}
