//! Agent behavior error types.

use hamlet_store::StoreError;
use hamlet_types::AgentId;
use thiserror::Error;

/// Errors surfaced by agent behavior operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An agent tried to interact with itself.
    #[error("agent {0} cannot interact with itself")]
    SelfInteraction(AgentId),
}
