//! Aggregate system attributes: total cores, total memory, and supported
//! performance configurations.

use pod_core::units;
use podgrid_inventory::ComputerSystem;

use crate::request::RequestSpec;

pub struct ComputerSystemAttributesMatcher;

impl ComputerSystemAttributesMatcher {
    pub fn matches(&self, request: &RequestSpec, system: &ComputerSystem) -> bool {
        if let Some(min_cores) = request.total_system_core_count {
            if total_cores(system) < min_cores as u64 {
                return false;
            }
        }
        if let Some(min_mib) = request.total_system_memory_mib {
            if total_memory_mib(system) < min_mib as f64 {
                return false;
            }
        }
        request
            .performance_configurations
            .iter()
            .all(|c| system.performance_configurations.contains(c))
    }
}

/// Sum of reported core counts; processors without one contribute nothing.
pub fn total_cores(system: &ComputerSystem) -> u64 {
    system
        .processors
        .iter()
        .filter_map(|p| p.total_cores)
        .map(u64::from)
        .sum()
}

/// Sum of module capacities, or the GiB memory summary when the system
/// reports no modules.
pub fn total_memory_mib(system: &ComputerSystem) -> f64 {
    if system.memory_modules.is_empty() {
        return system.memory_summary_gib.map(units::gib_to_mib).unwrap_or(0.0);
    }
    system
        .memory_modules
        .iter()
        .filter_map(|m| m.capacity_mib)
        .sum::<u64>() as f64
}
