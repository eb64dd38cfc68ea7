//! Memory saturation with the memory-summary fallback.

use pod_core::units;
use podgrid_inventory::{ComputerSystem, Memory};

use crate::mappers::{MemoryMapper, ResourceMapper};
use crate::request::RequestedMemory;

pub struct MemoryMatcher;

impl MemoryMatcher {
    pub fn matches(&self, requested: &[RequestedMemory], system: &ComputerSystem) -> bool {
        if requested.is_empty() {
            return true;
        }
        let available = available_memory(system);

        let requested_mib: u64 = requested.iter().filter_map(|m| m.capacity_mib).sum();
        let available_mib: u64 = available.iter().filter_map(|m| m.capacity_mib).sum();
        if available_mib < requested_mib {
            return false;
        }

        MemoryMapper.saturates(requested, &available)
    }
}

/// The system's modules, or one synthetic module sized from the memory
/// summary when the system reports none.
pub fn available_memory(system: &ComputerSystem) -> Vec<Memory> {
    if !system.memory_modules.is_empty() {
        return system.memory_modules.clone();
    }
    match system.memory_summary_gib {
        Some(gib) => vec![Memory {
            id: system.id.clone(),
            capacity_mib: Some(units::gib_to_mib(gib) as u64),
            memory_device_type: None,
            operating_speed_mhz: None,
            data_width_bits: None,
            manufacturer: None,
            chassis: None,
        }],
        None => Vec::new(),
    }
}
