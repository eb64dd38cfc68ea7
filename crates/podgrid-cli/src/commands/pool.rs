use std::process::ExitCode;

use anyhow::Context;

use pod_core::{EngineConfig, Protocol};
use podgrid_matcher::{MatchError, StoragePoolSelector};

use super::InventorySource;

pub fn select_pool(
    config: &EngineConfig,
    source: &InventorySource,
    capacity_gib: f64,
    protocol: &str,
) -> anyhow::Result<ExitCode> {
    let protocol = parse_protocol(protocol)?;
    let store = source.open(config)?;

    match StoragePoolSelector::new(&store).select_gib(capacity_gib, protocol) {
        Ok(pool) => {
            println!("{}", pool.id);
            Ok(ExitCode::SUCCESS)
        }
        Err(MatchError::NoFeasibleCandidate { trail }) => {
            eprintln!("no storage pool fits: {trail}");
            Ok(ExitCode::from(2))
        }
        Err(err) => Err(err.into()),
    }
}

/// Parse a protocol by its Redfish name, e.g. `NVMeOverFabrics`.
fn parse_protocol(name: &str) -> anyhow::Result<Protocol> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .with_context(|| format!("unknown protocol {name:?}"))
}
