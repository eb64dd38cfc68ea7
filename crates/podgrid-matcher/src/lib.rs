//! PodGrid allocation matcher — finds the computer systems able to back a
//! requested node.
//!
//! The matcher is a feasibility check, not a placement policy: it reports
//! every system that could satisfy the request and leaves the choice among
//! them to the caller. It never writes to the inventory.
//!
//! # Components
//!
//! - **`system_matcher`** — the ten-stage candidate pipeline
//! - **`filtering`** — ordered predicate reduction with a diagnostic trail
//! - **`bipartite`** / **`mappers`** — saturating assignment of requested
//!   items to compatible available items
//! - **`processor`**, **`memory`**, **`local_storage`**, **`ethernet`** —
//!   per-resource matchers and their available pools
//! - **`attributes`**, **`security`** — aggregate and security posture checks
//! - **`chassis`** — chassis resolution and chassis-scoped system lookups
//! - **`storage_pool`** — first-fit pool selection for remote drives

pub mod attributes;
pub mod bipartite;
pub mod chassis;
pub mod error;
pub mod ethernet;
pub mod filtering;
pub mod local_storage;
pub mod mappers;
pub mod memory;
pub mod processor;
pub mod request;
pub mod security;
pub mod storage_pool;
pub mod system_matcher;

pub use chassis::ChassisCollector;
pub use error::{MatchError, MatchResult};
pub use filtering::FilteringCollection;
pub use local_storage::{LocalStorage, LocalStorageCollector};
pub use request::*;
pub use storage_pool::StoragePoolSelector;
pub use system_matcher::{ComputerSystemMatcher, MatcherConfig};
