//! The abstract node request a caller asks the matcher to satisfy.
//!
//! Every field is optional. An unset scalar or an empty list imposes no
//! constraint. Requested items may pin a concrete inventory resource through
//! `resource` and a chassis through `chassis`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use pod_core::{
    InstructionSet, InterfaceType, MediaType, MemoryDeviceType, PerformanceConfigurationType,
    ProcessorType, Protocol, ResourceId,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSpec {
    /// Minimum sum of core counts across the system's processors.
    pub total_system_core_count: Option<u32>,
    /// Minimum total system memory, in MiB.
    pub total_system_memory_mib: Option<u64>,
    pub processors: Vec<RequestedProcessor>,
    pub memory: Vec<RequestedMemory>,
    pub local_drives: Vec<RequestedLocalDrive>,
    pub remote_drives: Vec<RequestedRemoteDrive>,
    pub ethernet_interfaces: Vec<RequestedEthernetInterface>,
    pub security: Option<RequestedSecurity>,
    pub performance_configurations: Vec<PerformanceConfigurationType>,
    /// Explicit target system.
    pub system: Option<ResourceId>,
    /// Chassis the chosen system must sit under.
    pub chassis: BTreeSet<ResourceId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestedProcessor {
    pub model: Option<String>,
    pub brand: Option<String>,
    pub instruction_set: Option<InstructionSet>,
    pub processor_type: Option<ProcessorType>,
    pub total_cores: Option<u32>,
    pub achievable_speed_mhz: Option<u32>,
    pub resource: Option<ResourceId>,
    pub chassis: Option<ResourceId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestedMemory {
    pub capacity_mib: Option<u64>,
    pub memory_device_type: Option<MemoryDeviceType>,
    pub speed_mhz: Option<u32>,
    pub data_width_bits: Option<u32>,
    pub manufacturer: Option<String>,
    pub resource: Option<ResourceId>,
    pub chassis: Option<ResourceId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestedLocalDrive {
    pub capacity_gib: Option<f64>,
    pub media_type: Option<MediaType>,
    pub protocol: Option<Protocol>,
    pub min_rpm: Option<u32>,
    pub serial_number: Option<String>,
    pub resource: Option<ResourceId>,
    pub chassis: Option<ResourceId>,
    /// Require (or forbid) a drive discovered through a PCIe switch.
    pub fabric_switch: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestedRemoteDrive {
    pub capacity_gib: Option<f64>,
    pub protocol: Option<Protocol>,
    /// Existing fabric endpoint or volume backing the drive.
    pub resource: Option<ResourceId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestedEthernetInterface {
    pub speed_mbps: Option<u32>,
    /// VLAN ids to configure on the interface.
    pub vlans: Vec<u32>,
    pub resource: Option<ResourceId>,
    pub chassis: Option<ResourceId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestedSecurity {
    pub tpm_present: Option<bool>,
    pub tpm_interface_type: Option<InterfaceType>,
    pub txt_enabled: Option<bool>,
}

impl RequestSpec {
    /// Chassis the system itself must sit under. Local-drive chassis are
    /// excluded since they usually house drives rather than systems.
    pub fn system_chassis_ids(&self) -> BTreeSet<ResourceId> {
        let mut ids = self.chassis.clone();
        ids.extend(self.processors.iter().filter_map(|p| p.chassis.clone()));
        ids.extend(self.memory.iter().filter_map(|m| m.chassis.clone()));
        ids.extend(self.ethernet_interfaces.iter().filter_map(|e| e.chassis.clone()));
        ids
    }

    pub fn local_drive_chassis_ids(&self) -> BTreeSet<ResourceId> {
        self.local_drives
            .iter()
            .filter_map(|d| d.chassis.clone())
            .collect()
    }

    /// Concrete system-side resources pinned by requested items.
    pub fn resource_references(&self) -> BTreeSet<ResourceId> {
        let processors = self.processors.iter().filter_map(|p| p.resource.clone());
        let memory = self.memory.iter().filter_map(|m| m.resource.clone());
        let drives = self.local_drives.iter().filter_map(|d| d.resource.clone());
        let nics = self.ethernet_interfaces.iter().filter_map(|e| e.resource.clone());
        processors.chain(memory).chain(drives).chain(nics).collect()
    }
}
