//! podgrid-inventory — the discovered-resource inventory for PodGrid.
//!
//! Backed by [redb](https://docs.rs/redb), holds the computer systems,
//! chassis, drives, and PCIe fabric topology that the matching engine reads.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns,
//! keyed by resource URI. The [`Inventory`] trait is the read-only contract
//! the matcher depends on; [`InventoryStore`] implements it and is `Clone` +
//! `Send` + `Sync` (backed by `Arc<Database>`).

pub mod error;
pub mod inventory;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{InventoryError, InventoryResult};
pub use inventory::Inventory;
pub use store::InventoryStore;
pub use types::*;
