//! podgrid.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::Protocol;

const DEFAULT_LOG_FILTER: &str = "info,podgrid=debug";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub logging: Option<LoggingConfig>,
    pub matching: Option<MatchingConfig>,
    pub inventory: Option<InventoryConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub json: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub rdma_protocols: Option<Vec<Protocol>>,
    pub require_explicit_fabric_drive_selection: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryConfig {
    pub path: Option<PathBuf>,
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn log_filter(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.filter.as_deref())
            .unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    /// Interface protocols that satisfy an NVMe-over-Fabrics remote drive.
    pub fn rdma_protocols(&self) -> Vec<Protocol> {
        self.matching
            .as_ref()
            .and_then(|m| m.rdma_protocols.clone())
            .unwrap_or_else(|| Protocol::DEFAULT_RDMA.to_vec())
    }

    /// Whether un-erased fabric drives must be named explicitly to be used.
    pub fn require_explicit_fabric_drive_selection(&self) -> bool {
        self.matching
            .as_ref()
            .and_then(|m| m.require_explicit_fabric_drive_selection)
            .unwrap_or(true)
    }

    pub fn inventory_path(&self) -> Option<&Path> {
        self.inventory.as_ref().and_then(|i| i.path.as_deref())
    }

    /// Scaffold a podgrid.toml with every default spelled out.
    pub fn scaffold(inventory_path: &Path) -> Self {
        EngineConfig {
            logging: Some(LoggingConfig {
                filter: Some(DEFAULT_LOG_FILTER.to_string()),
                json: Some(false),
            }),
            matching: Some(MatchingConfig {
                rdma_protocols: Some(Protocol::DEFAULT_RDMA.to_vec()),
                require_explicit_fabric_drive_selection: Some(true),
            }),
            inventory: Some(InventoryConfig {
                path: Some(inventory_path.to_path_buf()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert!(!config.log_json());
        assert_eq!(config.rdma_protocols(), vec![Protocol::Roce, Protocol::RoceV2]);
        assert!(config.require_explicit_fabric_drive_selection());
        assert!(config.inventory_path().is_none());
    }

    #[test]
    fn parse_matching_section() {
        let toml_str = r#"
[matching]
rdma_protocols = ["RoCEv2"]
require_explicit_fabric_drive_selection = false

[inventory]
path = "/var/lib/podgrid/inventory.redb"
"#;
        let config: EngineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.rdma_protocols(), vec![Protocol::RoceV2]);
        assert!(!config.require_explicit_fabric_drive_selection());
        assert_eq!(
            config.inventory_path(),
            Some(Path::new("/var/lib/podgrid/inventory.redb"))
        );
    }

    #[test]
    fn scaffold_spells_out_defaults() {
        let config = EngineConfig::scaffold(Path::new("inventory.redb"));
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("RoCEv2"));
        assert!(toml_str.contains("inventory.redb"));
    }
}
