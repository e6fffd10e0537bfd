//! Society-layer error types.

use hamlet_store::StoreError;
use hamlet_types::VillageId;
use thiserror::Error;

/// Errors surfaced by village, governance, and culture operations.
#[derive(Debug, Error)]
pub enum SocietyError {
    /// A store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A village has no members to operate on.
    #[error("village {0} has no members")]
    EmptyVillage(VillageId),
}
