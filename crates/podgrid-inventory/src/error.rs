//! Error types for the PodGrid inventory store.

use pod_core::ResourceId;
use thiserror::Error;

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Faults raised by the inventory collaborator. None of these say anything
/// about whether a request is satisfiable; they mean the inventory itself
/// could not be consulted.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("failed to open inventory database: {0}")]
    Open(String),

    #[error("inventory transaction failed: {0}")]
    Transaction(String),

    #[error("inventory table {table} unavailable: {reason}")]
    Table { table: String, reason: String },

    #[error("failed to read {table}: {reason}")]
    Read { table: String, reason: String },

    #[error("failed to store {key} in {table}: {reason}")]
    Write {
        table: String,
        key: ResourceId,
        reason: String,
    },

    #[error("malformed {table} record: {reason}")]
    Corrupt { table: String, reason: String },

    #[error("{kind} not found in inventory: {id}")]
    NotFound { kind: &'static str, id: ResourceId },
}
