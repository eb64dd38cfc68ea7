//! redb table definitions for the PodGrid inventory store.
//!
//! Every table uses the resource URI as its `&str` key and a JSON-serialized
//! entity as its `&[u8]` value.

use redb::TableDefinition;

pub const SYSTEMS: TableDefinition<&str, &[u8]> = TableDefinition::new("systems");

pub const CHASSIS: TableDefinition<&str, &[u8]> = TableDefinition::new("chassis");

pub const DRIVES: TableDefinition<&str, &[u8]> = TableDefinition::new("drives");

/// Fabric-reachable processors only; embedded ones live inside their system.
pub const PROCESSORS: TableDefinition<&str, &[u8]> = TableDefinition::new("processors");

pub const SWITCHES: TableDefinition<&str, &[u8]> = TableDefinition::new("switches");

pub const PORTS: TableDefinition<&str, &[u8]> = TableDefinition::new("ports");

pub const ENDPOINTS: TableDefinition<&str, &[u8]> = TableDefinition::new("endpoints");

pub const ETHERNET_SWITCH_PORTS: TableDefinition<&str, &[u8]> = TableDefinition::new("ethernet_switch_ports");

pub const VOLUMES: TableDefinition<&str, &[u8]> = TableDefinition::new("volumes");

pub const STORAGE_POOLS: TableDefinition<&str, &[u8]> = TableDefinition::new("storage_pools");

pub const ALL: [TableDefinition<&str, &[u8]>; 10] = [
    SYSTEMS,
    CHASSIS,
    DRIVES,
    PROCESSORS,
    SWITCHES,
    PORTS,
    ENDPOINTS,
    ETHERNET_SWITCH_PORTS,
    VOLUMES,
    STORAGE_POOLS,
];
