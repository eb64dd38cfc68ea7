//! Processor saturation against local and fabric-attached processors.

use std::collections::BTreeMap;

use tracing::debug;

use pod_core::{ProcessorConnectivity, ProcessorType};
use podgrid_inventory::{ComputerSystem, Inventory, Processor};

use crate::error::MatchResult;
use crate::mappers::{ProcessorMapper, ResourceMapper};
use crate::request::RequestedProcessor;

pub struct ProcessorMatcher<'a> {
    inventory: &'a dyn Inventory,
}

impl<'a> ProcessorMatcher<'a> {
    pub fn new(inventory: &'a dyn Inventory) -> Self {
        Self { inventory }
    }

    pub fn matches(&self, requested: &[RequestedProcessor], system: &ComputerSystem) -> MatchResult<bool> {
        if requested.is_empty() {
            return Ok(true);
        }
        let available = self.available_processors(system)?;
        if available.is_empty() {
            debug!(system = %system.id, "no achievable processors");
            return Ok(false);
        }
        Ok(ProcessorMapper.saturates(requested, &available))
    }

    /// The system's own processors, processors behind its PCIe switches, and
    /// Ethernet-attached FPGAs, restricted to achievable ones.
    pub fn available_processors(&self, system: &ComputerSystem) -> MatchResult<Vec<Processor>> {
        let mut pool = BTreeMap::new();
        for processor in &system.processors {
            pool.entry(processor.id.clone()).or_insert_with(|| processor.clone());
        }

        for port in self
            .inventory
            .upstream_ports_by_connection_ids(&system.pcie_connection_ids)?
        {
            for processor in self.inventory.achievable_pcie_processors(&port)? {
                pool.entry(processor.id.clone()).or_insert(processor);
            }
        }

        for processor in self.inventory.fabric_processors()? {
            if processor.connectivity == ProcessorConnectivity::Ethernet
                && processor.processor_type == Some(ProcessorType::Fpga)
                && !processor.allocated
            {
                pool.entry(processor.id.clone()).or_insert(processor);
            }
        }

        Ok(pool.into_values().filter(|p| p.achievable).collect())
    }
}
