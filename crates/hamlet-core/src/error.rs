//! Runtime error type.

use hamlet_agents::AgentError;
use hamlet_society::SocietyError;
use hamlet_store::StoreError;

/// Errors surfaced by the simulation runtime.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An agent-level engine failed.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// A society-level engine failed.
    #[error(transparent)]
    Society(#[from] SocietyError),
}
