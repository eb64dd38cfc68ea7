use std::path::Path;
use std::process::ExitCode;

use pod_core::EngineConfig;

pub fn init(path: &Path, inventory: &Path) -> anyhow::Result<ExitCode> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    let config = EngineConfig::scaffold(inventory);
    std::fs::write(path, config.to_toml_string()?)?;
    println!("✓ Generated {}", path.display());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffold_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("podgrid.toml");
        init(&path, Path::new("inventory.redb")).unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.inventory_path(), Some(Path::new("inventory.redb")));
        assert!(init(&path, Path::new("inventory.redb")).is_err());
    }
}
