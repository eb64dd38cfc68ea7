//! pod-core — vocabulary shared by the PodGrid inventory and matcher crates.

pub mod config;
pub mod resource;
pub mod types;
pub mod units;

pub use config::EngineConfig;
pub use resource::{ResourceError, ResourceId, ResourceKind};
pub use types::*;
