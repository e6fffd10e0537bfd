//! Store error types.

use hamlet_types::{AgentId, GoalId, TradeId, VillageId};
use thiserror::Error;

/// Errors surfaced by store operations.
///
/// Every variant except [`StoreError::Poisoned`] is recoverable: callers
/// log and continue the cycle. A poisoned lock means a writer panicked
/// mid-update and the backend can no longer vouch for its own invariants,
/// so that one is fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No agent exists with the given id.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// No status row exists for the given agent.
    #[error("agent status not found: {0}")]
    StatusNotFound(AgentId),

    /// No village exists with the given id.
    #[error("village not found: {0}")]
    VillageNotFound(VillageId),

    /// No goal exists with the given id.
    #[error("goal not found: {0}")]
    GoalNotFound(GoalId),

    /// No trade exists with the given id.
    #[error("trade not found: {0}")]
    TradeNotFound(TradeId),

    /// An agent with this name already exists.
    #[error("agent name already taken: {0}")]
    DuplicateName(String),

    /// The agent is already a member of a village.
    #[error("agent {0} already belongs to a village")]
    AlreadyMember(AgentId),

    /// The backend lock was poisoned by a panicking writer.
    ///
    /// Fatal: the process should shut down rather than keep serving reads
    /// from a backend whose invariants may no longer hold.
    #[error("store lock poisoned")]
    Poisoned,
}
