//! Matcher error types.

use pod_core::ResourceId;
use podgrid_inventory::InventoryError;
use thiserror::Error;

/// Errors returned by a matching call.
///
/// `UnresolvableReference` and `NoFeasibleCandidate` describe the request
/// itself and will not change on retry with the same inputs. `Inventory`
/// wraps a fault of the backing store.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("{kind} reference does not exist in inventory: {id}")]
    UnresolvableReference { kind: &'static str, id: ResourceId },

    #[error("no feasible candidate: {trail}")]
    NoFeasibleCandidate { trail: String },

    #[error("inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

impl MatchError {
    pub fn unresolvable(kind: &'static str, id: &ResourceId) -> Self {
        MatchError::UnresolvableReference {
            kind,
            id: id.clone(),
        }
    }
}

pub type MatchResult<T> = Result<T, MatchError>;
