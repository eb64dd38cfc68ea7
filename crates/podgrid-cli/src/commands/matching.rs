use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;

use pod_core::{EngineConfig, ResourceId};
use podgrid_inventory::Inventory;
use podgrid_matcher::{ComputerSystemMatcher, MatchError, MatchResult, MatcherConfig, RequestSpec};

use super::InventorySource;

/// Exit status for a request no system can satisfy.
const INFEASIBLE: u8 = 2;

pub fn match_request(
    config: &EngineConfig,
    source: &InventorySource,
    request: &Path,
    format: &str,
) -> anyhow::Result<ExitCode> {
    let content =
        std::fs::read_to_string(request).with_context(|| format!("failed to read {}", request.display()))?;
    let request: RequestSpec =
        serde_json::from_str(&content).with_context(|| format!("invalid node request {}", request.display()))?;
    let store = source.open(config)?;

    match feasible_systems(&store, config, &request) {
        Ok(systems) => {
            match format {
                "json" => println!("{}", serde_json::to_string_pretty(&systems)?),
                _ => systems.iter().for_each(|id| println!("{id}")),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(MatchError::NoFeasibleCandidate { trail }) => {
            eprintln!("no feasible system: {trail}");
            Ok(ExitCode::from(INFEASIBLE))
        }
        Err(err @ MatchError::UnresolvableReference { .. }) => {
            eprintln!("{err}");
            Ok(ExitCode::from(INFEASIBLE))
        }
        Err(err) => Err(err.into()),
    }
}

fn feasible_systems(inventory: &dyn Inventory, config: &EngineConfig, request: &RequestSpec) -> MatchResult<Vec<ResourceId>> {
    let matcher = ComputerSystemMatcher::new(inventory, MatcherConfig::from(config));
    Ok(matcher
        .match_systems(request)?
        .into_iter()
        .map(|system| system.id)
        .collect())
}
