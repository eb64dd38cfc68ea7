//! Shared Redfish vocabulary used across PodGrid crates.

use serde::{Deserialize, Serialize};

/// Storage and fabric transport protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "PCIe")]
    Pcie,
    #[serde(rename = "AHCI")]
    Ahci,
    #[serde(rename = "SAS")]
    Sas,
    #[serde(rename = "SATA")]
    Sata,
    #[serde(rename = "USB")]
    Usb,
    #[serde(rename = "NVMe")]
    Nvme,
    #[serde(rename = "FC")]
    Fc,
    #[serde(rename = "iSCSI")]
    Iscsi,
    #[serde(rename = "FCoE")]
    Fcoe,
    #[serde(rename = "NVMeOverFabrics")]
    NvmeOverFabrics,
    #[serde(rename = "iWARP")]
    Iwarp,
    #[serde(rename = "RoCE")]
    Roce,
    #[serde(rename = "RoCEv2")]
    RoceV2,
    #[serde(rename = "OEM")]
    Oem,
}

impl Protocol {
    /// Protocols able to carry NVMe-over-Fabrics traffic out of the box.
    pub const DEFAULT_RDMA: [Protocol; 2] = [Protocol::Roce, Protocol::RoceV2];
}

/// Drive media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "SSD")]
    Ssd,
    #[serde(rename = "HDD")]
    Hdd,
    #[serde(rename = "SMR")]
    Smr,
}

/// Trusted module interface types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterfaceType {
    #[serde(rename = "TPM1_2")]
    Tpm1_2,
    #[serde(rename = "TPM2_0")]
    Tpm2_0,
    #[serde(rename = "TCM1_0")]
    Tcm1_0,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryDeviceType {
    #[serde(rename = "DDR")]
    Ddr,
    #[serde(rename = "DDR2")]
    Ddr2,
    #[serde(rename = "DDR3")]
    Ddr3,
    #[serde(rename = "DDR4")]
    Ddr4,
    #[serde(rename = "DDR4_SDRAM")]
    Ddr4Sdram,
    #[serde(rename = "LPDDR4_SDRAM")]
    Lpddr4Sdram,
    #[serde(rename = "SDRAM")]
    Sdram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessorType {
    #[serde(rename = "CPU")]
    Cpu,
    #[serde(rename = "GPU")]
    Gpu,
    #[serde(rename = "FPGA")]
    Fpga,
    #[serde(rename = "DSP")]
    Dsp,
    Accelerator,
    #[serde(rename = "OEM")]
    Oem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionSet {
    #[serde(rename = "x86")]
    X86,
    #[serde(rename = "x86-64")]
    X86_64,
    #[serde(rename = "IA-64")]
    Ia64,
    #[serde(rename = "ARM-A32")]
    ArmA32,
    #[serde(rename = "ARM-A64")]
    ArmA64,
    #[serde(rename = "OEM")]
    Oem,
}

/// How a processor is reachable from the system that would use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessorConnectivity {
    Local,
    #[serde(rename = "RemotePCIe")]
    RemotePcie,
    Ethernet,
}

/// Role of an entity connected to a fabric endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRole {
    Initiator,
    Target,
    Both,
}

/// Type of an entity connected to a fabric endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Drive,
    Processor,
    Volume,
    RootComplex,
    StorageInitiator,
    NetworkController,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortType {
    UpstreamPort,
    DownstreamPort,
    InterswitchPort,
    ManagementPort,
    BidirectionalPort,
    UnconfiguredPort,
}

/// Resource lifecycle state as reported by the managed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    Enabled,
    Disabled,
    StandbyOffline,
    StandbySpare,
    InTest,
    Starting,
    Absent,
    UnavailableOffline,
    Deferring,
    Quiesced,
    Updating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Health {
    #[serde(rename = "OK")]
    Ok,
    Warning,
    Critical,
}

/// Combined Redfish `Status` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub state: Option<State>,
    pub health: Option<Health>,
}

impl Status {
    pub const ENABLED_OK: Status = Status {
        state: Some(State::Enabled),
        health: Some(Health::Ok),
    };

    pub fn is_enabled_and_healthy(&self) -> bool {
        self.state == Some(State::Enabled) && self.health == Some(Health::Ok)
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::ENABLED_OK
    }
}

/// Opaque processor performance-configuration token (e.g. a speed-select
/// profile name) as advertised by the system.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceConfigurationType(pub String);

impl From<&str> for PerformanceConfigurationType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
