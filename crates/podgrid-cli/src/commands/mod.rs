use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use pod_core::EngineConfig;
use podgrid_inventory::{InventoryDocument, InventoryStore};

mod init;
mod matching;
mod pool;
mod seed;

pub use init::init;
pub use matching::match_request;
pub use pool::select_pool;
pub use seed::seed;

/// Where `match` and `select-pool` read the inventory from.
#[derive(Args, Debug, Default)]
pub struct InventorySource {
    /// Database file (default: [inventory] path from podgrid.toml)
    #[arg(long, conflicts_with = "inventory")]
    pub db: Option<PathBuf>,
    /// Load a JSON inventory document into memory instead of a database
    #[arg(short, long)]
    pub inventory: Option<PathBuf>,
}

impl InventorySource {
    pub fn open(&self, config: &EngineConfig) -> anyhow::Result<InventoryStore> {
        if let Some(document) = &self.inventory {
            let store = InventoryStore::open_in_memory()?;
            store.import(&read_document(document)?)?;
            return Ok(store);
        }
        let path = database_path(config, self.db.as_deref())?;
        InventoryStore::open(path).with_context(|| format!("failed to open inventory {}", path.display()))
    }
}

fn database_path<'a>(config: &'a EngineConfig, db: Option<&'a Path>) -> anyhow::Result<&'a Path> {
    db.or_else(|| config.inventory_path())
        .context("no inventory database: pass --db or set [inventory] path in podgrid.toml")
}

fn read_document(path: &Path) -> anyhow::Result<InventoryDocument> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid inventory document {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use podgrid_inventory::Inventory;

    const DOCUMENT: &str = r#"{
        "systems": [
            {"id": "/redfish/v1/Systems/1", "processors": [{"id": "/redfish/v1/Systems/1/Processors/1", "total_cores": 8}]},
            {"id": "/redfish/v1/Systems/2", "processors": [{"id": "/redfish/v1/Systems/2/Processors/1", "total_cores": 2}]}
        ],
        "storage_pools": [
            {"id": "/redfish/v1/StorageServices/1/StoragePools/1", "free_capacity_gib": 512.0, "protocol": "NVMeOverFabrics"}
        ]
    }"#;

    fn write_document(dir: &Path) -> PathBuf {
        let path = dir.join("inventory.json");
        std::fs::write(&path, DOCUMENT).unwrap();
        path
    }

    #[test]
    fn in_memory_source_loads_document() {
        let dir = tempfile::tempdir().unwrap();
        let source = InventorySource {
            db: None,
            inventory: Some(write_document(dir.path())),
        };
        let store = source.open(&EngineConfig::default()).unwrap();
        assert_eq!(store.computer_systems().unwrap().len(), 2);
    }

    #[test]
    fn database_path_falls_back_to_config() {
        let config = EngineConfig::scaffold(Path::new("/tmp/podgrid.redb"));
        assert_eq!(database_path(&config, None).unwrap(), Path::new("/tmp/podgrid.redb"));
        assert_eq!(
            database_path(&config, Some(Path::new("other.redb"))).unwrap(),
            Path::new("other.redb")
        );
        assert!(database_path(&EngineConfig::default(), None).is_err());
    }

    #[test]
    fn seeded_database_is_reopened() {
        let dir = tempfile::tempdir().unwrap();
        let document = write_document(dir.path());
        let db = dir.path().join("inventory.redb");
        seed(&EngineConfig::default(), &document, Some(&db)).unwrap();

        let source = InventorySource {
            db: Some(db),
            inventory: None,
        };
        let store = source.open(&EngineConfig::default()).unwrap();
        assert_eq!(store.storage_pools().unwrap().len(), 1);
    }
}
