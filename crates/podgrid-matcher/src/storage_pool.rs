//! Storage-pool selection for remote-drive provisioning.

use tracing::{debug, warn};

use pod_core::{Protocol, units};
use podgrid_inventory::{Inventory, StoragePool};

use crate::error::{MatchError, MatchResult};
use crate::filtering::FilteringCollection;

pub struct StoragePoolSelector<'a> {
    inventory: &'a dyn Inventory,
}

impl<'a> StoragePoolSelector<'a> {
    pub fn new(inventory: &'a dyn Inventory) -> Self {
        Self { inventory }
    }

    /// The first pool, in inventory order, with at least `capacity_bytes`
    /// free and exactly the requested protocol.
    pub fn select(&self, capacity_bytes: u64, protocol: Protocol) -> MatchResult<StoragePool> {
        let mut pools = FilteringCollection::new(self.inventory.storage_pools()?);
        pools
            .filter("capacity", |pool| units::gib_to_bytes(pool.free_capacity_gib) >= capacity_bytes)
            .filter("protocol", |pool| pool.protocol == Some(protocol));

        let trail = pools.trail().to_string();
        match pools.into_items().into_iter().next() {
            Some(pool) => {
                debug!(pool = %pool.id, capacity_bytes, ?protocol, "storage pool selected");
                Ok(pool)
            }
            None => {
                warn!(%trail, capacity_bytes, ?protocol, "no storage pool can hold the volume");
                Err(MatchError::NoFeasibleCandidate { trail })
            }
        }
    }

    pub fn select_gib(&self, capacity_gib: f64, protocol: Protocol) -> MatchResult<StoragePool> {
        self.select(units::gib_to_bytes(capacity_gib), protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podgrid_inventory::{InventoryDocument, InventoryStore};

    fn make_pool(id: &str, free_gib: f64, protocol: Protocol) -> StoragePool {
        StoragePool {
            id: id.into(),
            free_capacity_gib: free_gib,
            protocol: Some(protocol),
        }
    }

    fn make_store() -> InventoryStore {
        let store = InventoryStore::open_in_memory().unwrap();
        store
            .import(&InventoryDocument {
                storage_pools: vec![
                    make_pool("/redfish/v1/StorageServices/1/StoragePools/a", 50.0, Protocol::NvmeOverFabrics),
                    make_pool("/redfish/v1/StorageServices/1/StoragePools/b", 500.0, Protocol::Iscsi),
                    make_pool("/redfish/v1/StorageServices/1/StoragePools/c", 200.0, Protocol::NvmeOverFabrics),
                    make_pool("/redfish/v1/StorageServices/1/StoragePools/d", 900.0, Protocol::NvmeOverFabrics),
                ],
                ..Default::default()
            })
            .unwrap();
        store
    }

    #[test]
    fn first_fit_not_best_fit() {
        let store = make_store();
        let pool = StoragePoolSelector::new(&store)
            .select_gib(100.0, Protocol::NvmeOverFabrics)
            .unwrap();
        assert_eq!(pool.id.as_str(), "/redfish/v1/StorageServices/1/StoragePools/c");
    }

    #[test]
    fn exact_capacity_fits() {
        let store = make_store();
        let pool = StoragePoolSelector::new(&store)
            .select(units::BYTES_PER_GIB * 50, Protocol::NvmeOverFabrics)
            .unwrap();
        assert_eq!(pool.id.as_str(), "/redfish/v1/StorageServices/1/StoragePools/a");
    }

    #[test]
    fn protocol_must_match() {
        let store = make_store();
        let pool = StoragePoolSelector::new(&store)
            .select_gib(100.0, Protocol::Iscsi)
            .unwrap();
        assert_eq!(pool.id.as_str(), "/redfish/v1/StorageServices/1/StoragePools/b");
    }

    #[test]
    fn no_pool_large_enough_is_infeasible() {
        let store = make_store();
        let err = StoragePoolSelector::new(&store)
            .select_gib(1000.0, Protocol::NvmeOverFabrics)
            .unwrap_err();
        match err {
            MatchError::NoFeasibleCandidate { trail } => {
                assert_eq!(trail, "available: 4 -> capacity: 0 -> protocol: 0");
            }
            other => panic!("expected NoFeasibleCandidate, got {other:?}"),
        }
    }
}
