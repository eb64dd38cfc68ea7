//! Domain types for the PodGrid inventory.
//!
//! These mirror the discovered Redfish resources a pod manager keeps about
//! its racks: computer systems with their embedded components, chassis
//! containment, PCIe fabric topology (switches, ports, endpoints), drives,
//! volumes, and storage pools. All types are serializable to/from JSON for
//! storage in redb tables and for seeding from inventory documents.

use serde::{Deserialize, Serialize};

use pod_core::{
    EntityRole, EntityType, InstructionSet, InterfaceType, MediaType, MemoryDeviceType,
    PerformanceConfigurationType, PortType, ProcessorConnectivity, ProcessorType, Protocol,
    ResourceId, Status, units,
};

fn default_true() -> bool {
    true
}

fn default_connectivity() -> ProcessorConnectivity {
    ProcessorConnectivity::Local
}

// ── Computer system ───────────────────────────────────────────────

/// A physically discovered computer system and its embedded components.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComputerSystem {
    pub id: ResourceId,
    /// Whether the system is currently reachable through its managing service.
    #[serde(default = "default_true")]
    pub achievable: bool,
    /// Whether the system already backs a composed node.
    #[serde(default)]
    pub allocated: bool,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub processors: Vec<Processor>,
    #[serde(default)]
    pub memory_modules: Vec<Memory>,
    /// `MemorySummary.TotalSystemMemoryGiB`, used when no modules are reported.
    #[serde(default)]
    pub memory_summary_gib: Option<f64>,
    #[serde(default)]
    pub ethernet_interfaces: Vec<EthernetInterface>,
    #[serde(default)]
    pub trusted_modules: Vec<TrustedModule>,
    /// Tri-state: `None` means the service did not report TXT.
    #[serde(default)]
    pub txt_enabled: Option<bool>,
    #[serde(default)]
    pub performance_configurations: Vec<PerformanceConfigurationType>,
    #[serde(default)]
    pub pcie_connection_ids: Vec<String>,
    #[serde(default)]
    pub chassis: Vec<ResourceId>,
    #[serde(default)]
    pub simple_storages: Vec<SimpleStorage>,
    #[serde(default)]
    pub storages: Vec<Storage>,
}

/// A processor, either embedded in a system or reachable over a fabric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Processor {
    pub id: ResourceId,
    #[serde(default)]
    pub processor_type: Option<ProcessorType>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub instruction_set: Option<InstructionSet>,
    #[serde(default)]
    pub total_cores: Option<u32>,
    #[serde(default)]
    pub max_speed_mhz: Option<u32>,
    #[serde(default = "default_connectivity")]
    pub connectivity: ProcessorConnectivity,
    #[serde(default)]
    pub chassis: Option<ResourceId>,
    /// Fabric endpoints exposing this processor (empty for local ones).
    #[serde(default)]
    pub endpoints: Vec<ResourceId>,
    #[serde(default = "default_true")]
    pub achievable: bool,
    #[serde(default)]
    pub allocated: bool,
}

/// A memory module embedded in a system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Memory {
    pub id: ResourceId,
    #[serde(default)]
    pub capacity_mib: Option<u64>,
    #[serde(default)]
    pub memory_device_type: Option<MemoryDeviceType>,
    #[serde(default)]
    pub operating_speed_mhz: Option<u32>,
    #[serde(default)]
    pub data_width_bits: Option<u32>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub chassis: Option<ResourceId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EthernetInterface {
    pub id: ResourceId,
    #[serde(default)]
    pub speed_mbps: Option<u32>,
    #[serde(default)]
    pub supported_protocols: Vec<Protocol>,
    /// Resolved against switch ports' neighbor MACs to find the cabled port.
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub chassis: Option<ResourceId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrustedModule {
    #[serde(default)]
    pub interface_type: Option<InterfaceType>,
    #[serde(default)]
    pub firmware_version: Option<String>,
}

/// Simple storage subsystem: a flat list of devices without drive entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimpleStorage {
    pub id: ResourceId,
    #[serde(default)]
    pub devices: Vec<SimpleStorageDevice>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimpleStorageDevice {
    pub id: ResourceId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub capacity_bytes: Option<u64>,
    #[serde(default)]
    pub status: Status,
}

/// Storage-controller subsystem; drives live in their own table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Storage {
    pub id: ResourceId,
    #[serde(default)]
    pub drives: Vec<ResourceId>,
}

// ── Drives, volumes, pools ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Drive {
    pub id: ResourceId,
    #[serde(default)]
    pub capacity_bytes: Option<u64>,
    #[serde(default)]
    pub protocol: Option<Protocol>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub rotation_speed_rpm: Option<u32>,
    /// Whether the drive has been securely erased since its last use.
    #[serde(default)]
    pub drive_erased: Option<bool>,
    #[serde(default = "default_true")]
    pub achievable: bool,
    #[serde(default)]
    pub allocated: bool,
    #[serde(default)]
    pub chassis: Option<ResourceId>,
    /// System whose storage controller owns this drive, if any.
    #[serde(default)]
    pub system: Option<ResourceId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Volume {
    pub id: ResourceId,
    #[serde(default)]
    pub capacity_bytes: Option<u64>,
    #[serde(default)]
    pub protocol: Option<Protocol>,
    #[serde(default)]
    pub storage_pool: Option<ResourceId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoragePool {
    pub id: ResourceId,
    #[serde(default)]
    pub free_capacity_gib: f64,
    #[serde(default)]
    pub protocol: Option<Protocol>,
}

// ── Chassis and fabric topology ───────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chassis {
    pub id: ResourceId,
    #[serde(default)]
    pub chassis_type: Option<String>,
    #[serde(default)]
    pub contained_by: Option<ResourceId>,
    /// Directly contained chassis.
    #[serde(default)]
    pub contains: Vec<ResourceId>,
    #[serde(default)]
    pub computer_systems: Vec<ResourceId>,
    #[serde(default)]
    pub drives: Vec<ResourceId>,
    #[serde(default)]
    pub switches: Vec<ResourceId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Switch {
    pub id: ResourceId,
    #[serde(default)]
    pub protocol: Option<Protocol>,
    #[serde(default)]
    pub ports: Vec<ResourceId>,
    #[serde(default)]
    pub chassis: Option<ResourceId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Port {
    pub id: ResourceId,
    pub switch: ResourceId,
    #[serde(default)]
    pub port_type: Option<PortType>,
    #[serde(default)]
    pub pcie_connection_ids: Vec<String>,
    #[serde(default)]
    pub endpoints: Vec<ResourceId>,
}

/// A port of an Ethernet switch, with the MAC address its LLDP neighbor
/// reported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EthernetSwitchPort {
    pub id: ResourceId,
    #[serde(default)]
    pub neighbor_mac: Option<String>,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Endpoint {
    pub id: ResourceId,
    #[serde(default)]
    pub protocol: Option<Protocol>,
    #[serde(default)]
    pub connected_entities: Vec<ConnectedEntity>,
    #[serde(default)]
    pub ports: Vec<ResourceId>,
    #[serde(default = "default_true")]
    pub achievable: bool,
    #[serde(default)]
    pub allocated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectedEntity {
    #[serde(default)]
    pub entity: Option<ResourceId>,
    #[serde(default)]
    pub entity_type: Option<EntityType>,
    #[serde(default)]
    pub role: Option<EntityRole>,
}

/// Bulk inventory snapshot, used to seed a store in one transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InventoryDocument {
    #[serde(default)]
    pub systems: Vec<ComputerSystem>,
    #[serde(default)]
    pub chassis: Vec<Chassis>,
    #[serde(default)]
    pub drives: Vec<Drive>,
    #[serde(default)]
    pub processors: Vec<Processor>,
    #[serde(default)]
    pub switches: Vec<Switch>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub ethernet_switch_ports: Vec<EthernetSwitchPort>,
    #[serde(default)]
    pub volumes: Vec<Volume>,
    #[serde(default)]
    pub storage_pools: Vec<StoragePool>,
}

impl ComputerSystem {
    /// Identifiers of every drive attached through a storage controller.
    pub fn storage_drive_ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.storages.iter().flat_map(|s| s.drives.iter())
    }

    pub fn shares_pcie_connection(&self, connection_ids: &[String]) -> bool {
        self.pcie_connection_ids
            .iter()
            .any(|id| connection_ids.contains(id))
    }
}

impl Drive {
    pub fn capacity_gib(&self) -> Option<f64> {
        self.capacity_bytes.map(units::bytes_to_gib)
    }

    pub fn is_nvme(&self) -> bool {
        self.protocol == Some(Protocol::Nvme)
    }
}

impl Switch {
    pub fn is_pcie(&self) -> bool {
        self.protocol == Some(Protocol::Pcie)
    }
}

impl Port {
    pub fn is_upstream(&self) -> bool {
        self.port_type == Some(PortType::UpstreamPort)
    }

    pub fn is_downstream(&self) -> bool {
        self.port_type == Some(PortType::DownstreamPort)
    }
}

impl EthernetSwitchPort {
    /// MAC comparison ignores case and separator style.
    pub fn has_neighbor(&self, mac: &str) -> bool {
        self.neighbor_mac
            .as_deref()
            .is_some_and(|neighbor| normalize_mac(neighbor) == normalize_mac(mac))
    }
}

fn normalize_mac(mac: &str) -> String {
    mac.chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl Endpoint {
    /// An endpoint can be attached to a new node when nothing holds it.
    pub fn is_attachable(&self) -> bool {
        self.achievable && !self.allocated
    }

    /// Identifiers of connected entities of the given type.
    pub fn entities_of_type(&self, entity_type: EntityType) -> impl Iterator<Item = &ResourceId> {
        self.connected_entities
            .iter()
            .filter(move |e| e.entity_type == Some(entity_type))
            .filter_map(|e| e.entity.as_ref())
    }
}
