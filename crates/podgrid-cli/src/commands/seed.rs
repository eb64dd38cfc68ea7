use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use tracing::info;

use pod_core::EngineConfig;
use podgrid_inventory::InventoryStore;

use super::{database_path, read_document};

pub fn seed(config: &EngineConfig, inventory: &Path, db: Option<&Path>) -> anyhow::Result<ExitCode> {
    let document = read_document(inventory)?;
    let path = database_path(config, db)?;
    let store =
        InventoryStore::open(path).with_context(|| format!("failed to open inventory {}", path.display()))?;
    store.import(&document)?;

    info!(
        path = %path.display(),
        systems = document.systems.len(),
        drives = document.drives.len(),
        "inventory seeded"
    );
    println!(
        "✓ Seeded {} systems, {} chassis, {} drives into {}",
        document.systems.len(),
        document.chassis.len(),
        document.drives.len(),
        path.display()
    );
    Ok(ExitCode::SUCCESS)
}
