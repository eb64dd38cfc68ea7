//! ComputerSystemMatcher — the candidate filter pipeline.
//!
//! Given a request and a candidate set, the matcher narrows the set through
//! ten fixed stages and returns the survivors:
//! 1. achievable
//! 2. enabled and healthy
//! 3. explicit system and pinned resources
//! 4. chassis membership
//! 5. processors
//! 6. memory
//! 7. local drives
//! 8. ethernet interfaces (with the RDMA side-constraint)
//! 9. aggregate attributes
//! 10. security
//!
//! References are resolved before the first stage runs, so an unknown
//! chassis or resource fails the call without filtering anything.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use pod_core::{EngineConfig, Protocol, ResourceId, ResourceKind};
use podgrid_inventory::{ComputerSystem, Inventory};

use crate::attributes::ComputerSystemAttributesMatcher;
use crate::chassis::ChassisCollector;
use crate::error::{MatchError, MatchResult};
use crate::ethernet::EthernetInterfaceMatcher;
use crate::filtering::FilteringCollection;
use crate::local_storage::{LocalStorageCollector, LocalStorageMatcher};
use crate::memory::MemoryMatcher;
use crate::processor::ProcessorMatcher;
use crate::request::RequestSpec;
use crate::security::ComputerSystemSecurityAttributesMatcher;

/// Matching knobs taken from `podgrid.toml`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    pub rdma_protocols: Vec<Protocol>,
    pub require_explicit_fabric_drive_selection: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for MatcherConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            rdma_protocols: config.rdma_protocols(),
            require_explicit_fabric_drive_selection: config.require_explicit_fabric_drive_selection(),
        }
    }
}

type Predicate = fn(&StageContext<'_>, &ComputerSystem) -> MatchResult<bool>;

struct Stage {
    name: &'static str,
    predicate: Predicate,
}

/// Everything a stage needs, resolved once per call.
struct StageContext<'r> {
    request: &'r RequestSpec,
    /// Systems every survivor must equal.
    pins: BTreeSet<ResourceId>,
    /// Systems allowed by the requested chassis, if any were requested.
    chassis_systems: Option<BTreeSet<ResourceId>>,
    requires_rdma: bool,
    processors: ProcessorMatcher<'r>,
    local_storage: LocalStorageMatcher<'r>,
    ethernet: EthernetInterfaceMatcher<'r>,
}

pub struct ComputerSystemMatcher<'a> {
    inventory: &'a dyn Inventory,
    config: MatcherConfig,
    stages: Vec<Stage>,
}

impl<'a> ComputerSystemMatcher<'a> {
    pub fn new(inventory: &'a dyn Inventory, config: MatcherConfig) -> Self {
        let stages = vec![
            Stage { name: "achievable", predicate: by_achievability },
            Stage { name: "enabled and healthy", predicate: by_status },
            Stage { name: "explicit system", predicate: by_pinned_system },
            Stage { name: "chassis", predicate: by_chassis },
            Stage { name: "processors", predicate: by_processors },
            Stage { name: "memory", predicate: by_memory },
            Stage { name: "local drives", predicate: by_local_drives },
            Stage { name: "ethernet interfaces", predicate: by_ethernet_interfaces },
            Stage { name: "attributes", predicate: by_attributes },
            Stage { name: "security", predicate: by_security },
        ];
        Self {
            inventory,
            config,
            stages,
        }
    }

    /// Narrow `candidates` to the systems able to satisfy `request`.
    pub fn matches(&self, request: &RequestSpec, candidates: Vec<ComputerSystem>) -> MatchResult<Vec<ComputerSystem>> {
        let cx = self.context(request)?;

        let mut working = FilteringCollection::new(candidates);
        for stage in &self.stages {
            working.try_filter(stage.name, |system| (stage.predicate)(&cx, system))?;
            debug!(stage = stage.name, remaining = working.len(), "stage applied");
        }

        if working.is_empty() {
            warn!(trail = working.trail(), "no feasible computer system");
            return Err(MatchError::NoFeasibleCandidate {
                trail: working.trail().to_string(),
            });
        }
        info!(survivors = working.len(), trail = working.trail(), "computer systems matched");
        Ok(working.into_items())
    }

    /// Match against every system the inventory still considers allocatable.
    pub fn match_systems(&self, request: &RequestSpec) -> MatchResult<Vec<ComputerSystem>> {
        let candidates = self.inventory.systems_possible_to_allocate()?;
        self.matches(request, candidates)
    }

    fn context<'r>(&'r self, request: &'r RequestSpec) -> MatchResult<StageContext<'r>> {
        let pins = self.resolve_pins(request)?;
        let chassis_systems = self.resolve_chassis(request)?;

        let ethernet = EthernetInterfaceMatcher::new(self.inventory, &self.config.rdma_protocols);
        let requires_rdma = ethernet.requires_rdma(&request.remote_drives)?;

        let collector = LocalStorageCollector::new(self.inventory, self.config.require_explicit_fabric_drive_selection);
        Ok(StageContext {
            request,
            pins,
            chassis_systems,
            requires_rdma,
            processors: ProcessorMatcher::new(self.inventory),
            local_storage: LocalStorageMatcher::new(collector),
            ethernet,
        })
    }

    fn resolve_pins(&self, request: &RequestSpec) -> MatchResult<BTreeSet<ResourceId>> {
        let mut pins = BTreeSet::new();
        if let Some(system) = &request.system {
            if self.inventory.computer_system(system)?.is_none() {
                return Err(MatchError::unresolvable(ResourceKind::ComputerSystem.collection(), system));
            }
            pins.insert(system.clone());
        }

        let references = request.resource_references();
        if references.is_empty() {
            return Ok(pins);
        }
        let systems = self.inventory.computer_systems()?;
        for reference in &references {
            let kind = reference
                .kind()
                .map_err(|_| MatchError::unresolvable("resource", reference))?;
            let lookup = owner_lookup(kind).ok_or_else(|| MatchError::unresolvable(kind.collection(), reference))?;
            if let Some(owner) = lookup(self.inventory, &systems, reference)? {
                debug!(%reference, %owner, "resource pins system");
                pins.insert(owner);
            }
        }
        Ok(pins)
    }

    fn resolve_chassis(&self, request: &RequestSpec) -> MatchResult<Option<BTreeSet<ResourceId>>> {
        let system_chassis = request.system_chassis_ids();
        let drive_chassis = request.local_drive_chassis_ids();
        if system_chassis.is_empty() && drive_chassis.is_empty() {
            return Ok(None);
        }
        let common = ChassisCollector::new(self.inventory).common_systems_by_chassis_ids(&system_chassis, &drive_chassis)?;
        Ok(Some(common))
    }
}

// ── Resource ownership ────────────────────────────────────────────

/// Finds the system owning a referenced resource. `Ok(None)` means the
/// resource exists but belongs to no system (a fabric drive or processor).
type OwnerLookup = fn(&dyn Inventory, &[ComputerSystem], &ResourceId) -> MatchResult<Option<ResourceId>>;

fn owner_lookup(kind: ResourceKind) -> Option<OwnerLookup> {
    match kind {
        ResourceKind::Processor => Some(processor_owner),
        ResourceKind::Memory => Some(memory_owner),
        ResourceKind::EthernetInterface => Some(ethernet_interface_owner),
        ResourceKind::SimpleStorage => Some(simple_storage_owner),
        ResourceKind::Drive => Some(drive_owner),
        _ => None,
    }
}

fn owning_system(systems: &[ComputerSystem], owns: impl Fn(&ComputerSystem) -> bool) -> Option<ResourceId> {
    systems.iter().find(|s| owns(s)).map(|s| s.id.clone())
}

fn processor_owner(
    inventory: &dyn Inventory,
    systems: &[ComputerSystem],
    id: &ResourceId,
) -> MatchResult<Option<ResourceId>> {
    if let Some(owner) = owning_system(systems, |s| s.processors.iter().any(|p| &p.id == id)) {
        return Ok(Some(owner));
    }
    match inventory.fabric_processor(id)? {
        Some(_) => Ok(None),
        None => Err(MatchError::unresolvable(ResourceKind::Processor.collection(), id)),
    }
}

fn memory_owner(_: &dyn Inventory, systems: &[ComputerSystem], id: &ResourceId) -> MatchResult<Option<ResourceId>> {
    owning_system(systems, |s| s.memory_modules.iter().any(|m| &m.id == id))
        .map(Some)
        .ok_or_else(|| MatchError::unresolvable(ResourceKind::Memory.collection(), id))
}

fn ethernet_interface_owner(
    _: &dyn Inventory,
    systems: &[ComputerSystem],
    id: &ResourceId,
) -> MatchResult<Option<ResourceId>> {
    owning_system(systems, |s| s.ethernet_interfaces.iter().any(|e| &e.id == id))
        .map(Some)
        .ok_or_else(|| MatchError::unresolvable(ResourceKind::EthernetInterface.collection(), id))
}

fn simple_storage_owner(
    _: &dyn Inventory,
    systems: &[ComputerSystem],
    id: &ResourceId,
) -> MatchResult<Option<ResourceId>> {
    let subsystem = id.resource_path();
    owning_system(systems, |s| {
        s.simple_storages
            .iter()
            .any(|ss| ss.id.as_str() == subsystem || ss.devices.iter().any(|d| &d.id == id))
    })
    .map(Some)
    .ok_or_else(|| MatchError::unresolvable(ResourceKind::SimpleStorage.collection(), id))
}

fn drive_owner(inventory: &dyn Inventory, _: &[ComputerSystem], id: &ResourceId) -> MatchResult<Option<ResourceId>> {
    match inventory.drive(id)? {
        Some(drive) => Ok(drive.system),
        None => Err(MatchError::unresolvable(ResourceKind::Drive.collection(), id)),
    }
}

// ── Stages ────────────────────────────────────────────────────────

fn by_achievability(_: &StageContext<'_>, system: &ComputerSystem) -> MatchResult<bool> {
    Ok(system.achievable)
}

fn by_status(_: &StageContext<'_>, system: &ComputerSystem) -> MatchResult<bool> {
    Ok(system.status.is_enabled_and_healthy())
}

fn by_pinned_system(cx: &StageContext<'_>, system: &ComputerSystem) -> MatchResult<bool> {
    Ok(cx.pins.iter().all(|pin| pin == &system.id))
}

fn by_chassis(cx: &StageContext<'_>, system: &ComputerSystem) -> MatchResult<bool> {
    Ok(cx
        .chassis_systems
        .as_ref()
        .is_none_or(|allowed| allowed.contains(&system.id)))
}

fn by_processors(cx: &StageContext<'_>, system: &ComputerSystem) -> MatchResult<bool> {
    cx.processors.matches(&cx.request.processors, system)
}

fn by_memory(cx: &StageContext<'_>, system: &ComputerSystem) -> MatchResult<bool> {
    Ok(MemoryMatcher.matches(&cx.request.memory, system))
}

fn by_local_drives(cx: &StageContext<'_>, system: &ComputerSystem) -> MatchResult<bool> {
    cx.local_storage.matches(&cx.request.local_drives, system)
}

fn by_ethernet_interfaces(cx: &StageContext<'_>, system: &ComputerSystem) -> MatchResult<bool> {
    cx.ethernet
        .matches(&cx.request.ethernet_interfaces, cx.requires_rdma, system)
}

fn by_attributes(cx: &StageContext<'_>, system: &ComputerSystem) -> MatchResult<bool> {
    Ok(ComputerSystemAttributesMatcher.matches(cx.request, system))
}

fn by_security(cx: &StageContext<'_>, system: &ComputerSystem) -> MatchResult<bool> {
    Ok(ComputerSystemSecurityAttributesMatcher.matches(cx.request.security.as_ref(), system))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_core::{Health, State, Status};
    use podgrid_inventory::{InventoryStore, Memory};

    fn make_system(id: &str) -> ComputerSystem {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "processors": [{"id": format!("{id}/Processors/1"), "total_cores": 8}],
            "memory_summary_gib": 16.0,
        }))
        .unwrap()
    }

    fn store_with(systems: &[ComputerSystem]) -> InventoryStore {
        let store = InventoryStore::open_in_memory().unwrap();
        for system in systems {
            store.put_system(system).unwrap();
        }
        store
    }

    fn ids(systems: &[ComputerSystem]) -> Vec<&str> {
        systems.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn trail_lists_every_stage_in_order() {
        let mut sick = make_system("/redfish/v1/Systems/2");
        sick.status = Status {
            state: Some(State::Enabled),
            health: Some(Health::Critical),
        };
        let systems = vec![make_system("/redfish/v1/Systems/1"), sick];
        let store = store_with(&systems);
        let matcher = ComputerSystemMatcher::new(&store, MatcherConfig::default());

        let request = RequestSpec {
            total_system_core_count: Some(64),
            ..Default::default()
        };
        match matcher.matches(&request, systems).unwrap_err() {
            MatchError::NoFeasibleCandidate { trail } => assert_eq!(
                trail,
                "available: 2 -> achievable: 2 -> enabled and healthy: 1 -> explicit system: 1 \
                 -> chassis: 1 -> processors: 1 -> memory: 1 -> local drives: 1 \
                 -> ethernet interfaces: 1 -> attributes: 0 -> security: 0"
            ),
            other => panic!("expected NoFeasibleCandidate, got {other:?}"),
        }
    }

    #[test]
    fn explicit_system_keeps_only_that_system() {
        let systems = vec![make_system("/redfish/v1/Systems/1"), make_system("/redfish/v1/Systems/2")];
        let store = store_with(&systems);
        let matcher = ComputerSystemMatcher::new(&store, MatcherConfig::default());
        let request = RequestSpec {
            system: Some("/redfish/v1/Systems/2".into()),
            ..Default::default()
        };
        let matched = matcher.matches(&request, systems).unwrap();
        assert_eq!(ids(&matched), vec!["/redfish/v1/Systems/2"]);
    }

    #[test]
    fn unknown_explicit_system_is_unresolvable() {
        let systems = vec![make_system("/redfish/v1/Systems/1")];
        let store = store_with(&systems);
        let matcher = ComputerSystemMatcher::new(&store, MatcherConfig::default());
        let request = RequestSpec {
            system: Some("/redfish/v1/Systems/9".into()),
            ..Default::default()
        };
        let err = matcher.matches(&request, systems).unwrap_err();
        assert!(matches!(err, MatchError::UnresolvableReference { kind: "Systems", .. }));
    }

    #[test]
    fn pinned_memory_selects_owning_system() {
        let mut owner = make_system("/redfish/v1/Systems/2");
        owner.memory_modules = vec![Memory {
            id: "/redfish/v1/Systems/2/Memory/1".into(),
            capacity_mib: Some(16384),
            memory_device_type: None,
            operating_speed_mhz: None,
            data_width_bits: None,
            manufacturer: None,
            chassis: None,
        }];
        let systems = vec![make_system("/redfish/v1/Systems/1"), owner];
        let store = store_with(&systems);
        let matcher = ComputerSystemMatcher::new(&store, MatcherConfig::default());

        let request: RequestSpec = serde_json::from_value(serde_json::json!({
            "memory": [{"resource": "/redfish/v1/Systems/2/Memory/1"}],
        }))
        .unwrap();
        let matched = matcher.matches(&request, systems).unwrap();
        assert_eq!(ids(&matched), vec!["/redfish/v1/Systems/2"]);
    }

    #[test]
    fn pinned_simple_storage_device_selects_owning_system() {
        let with_device = |id: &str| {
            let mut system = make_system(id);
            system.simple_storages = serde_json::from_value(serde_json::json!([{
                "id": format!("{id}/SimpleStorage/1"),
                "devices": [{"id": format!("{id}/SimpleStorage/1#/Devices/0"), "capacity_bytes": 480103981056u64}],
            }]))
            .unwrap();
            system
        };
        let systems = vec![with_device("/redfish/v1/Systems/1"), with_device("/redfish/v1/Systems/2")];
        let store = store_with(&systems);
        let matcher = ComputerSystemMatcher::new(&store, MatcherConfig::default());

        let request: RequestSpec = serde_json::from_value(serde_json::json!({
            "local_drives": [{"resource": "/redfish/v1/Systems/2/SimpleStorage/1#/Devices/0"}],
        }))
        .unwrap();
        let matched = matcher.matches(&request, systems).unwrap();
        assert_eq!(ids(&matched), vec!["/redfish/v1/Systems/2"]);
    }

    #[test]
    fn pins_on_two_systems_leave_nothing() {
        let systems = vec![make_system("/redfish/v1/Systems/1"), make_system("/redfish/v1/Systems/2")];
        let store = store_with(&systems);
        let matcher = ComputerSystemMatcher::new(&store, MatcherConfig::default());

        let request: RequestSpec = serde_json::from_value(serde_json::json!({
            "system": "/redfish/v1/Systems/1",
            "processors": [{"resource": "/redfish/v1/Systems/2/Processors/1"}],
        }))
        .unwrap();
        let err = matcher.matches(&request, systems).unwrap_err();
        assert!(matches!(err, MatchError::NoFeasibleCandidate { .. }));
    }

    #[test]
    fn unknown_resource_reference_is_unresolvable() {
        let systems = vec![make_system("/redfish/v1/Systems/1")];
        let store = store_with(&systems);
        let matcher = ComputerSystemMatcher::new(&store, MatcherConfig::default());

        for reference in [
            "/redfish/v1/Systems/1/Processors/404",
            "/redfish/v1/Systems/1/EthernetInterfaces/404",
            "/redfish/v1/Managers/1",
        ] {
            let request: RequestSpec = serde_json::from_value(serde_json::json!({
                "processors": [{"resource": reference}],
            }))
            .unwrap();
            let err = matcher.matches(&request, systems.clone()).unwrap_err();
            assert!(
                matches!(err, MatchError::UnresolvableReference { .. }),
                "{reference}: {err:?}"
            );
        }
    }

    #[test]
    fn config_defaults_follow_engine_config() {
        let config = MatcherConfig::default();
        assert_eq!(config.rdma_protocols, Protocol::DEFAULT_RDMA.to_vec());
        assert!(config.require_explicit_fabric_drive_selection);
    }
}
