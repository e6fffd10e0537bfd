//! The in-memory backend and the shared [`Store`] handle.
//!
//! All state lives behind one [`Mutex`]. Every public store method takes
//! the lock exactly once, performs its whole read-modify-write inside the
//! critical section, and releases it before returning, so each call is
//! atomic with respect to every other call. Scan-style readers clone what
//! they need under the lock and compute outside it.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use hamlet_types::{
    Agent, AgentId, AgentStatus, EmotionalState, Goal, GoalId, Memory, PairKey, Relationship,
    StoredEvent, Trade, TradeId, Village, VillageId, VillageMember,
};

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Store handle
// ---------------------------------------------------------------------------

/// Cheaply cloneable handle to the simulation store.
///
/// Clones share the same backend. The handle is the only way to touch
/// stored state; concern-specific operations live in the sibling modules
/// (`agent_store`, `social_store`, `village_store`, `event_store`,
/// `trade_store`) as `impl Store` blocks.
#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<Mutex<Inner>>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the backend lock, mapping poison to [`StoreError::Poisoned`].
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

// ---------------------------------------------------------------------------
// Backend state
// ---------------------------------------------------------------------------

/// All stored state. Only store modules see this.
#[derive(Debug, Default)]
pub(crate) struct Inner {
    /// Agent identity rows by id.
    pub(crate) agents: HashMap<AgentId, Agent>,
    /// Latest physical status per agent.
    pub(crate) statuses: HashMap<AgentId, AgentStatus>,
    /// Append-only emotional time series per agent.
    pub(crate) emotions: HashMap<AgentId, Vec<EmotionalState>>,
    /// Append-only memories per agent, in insertion order.
    pub(crate) memories: HashMap<AgentId, Vec<Memory>>,
    /// Relationship graph keyed by canonical pair.
    pub(crate) relationships: BTreeMap<PairKey, Relationship>,
    /// Villages by id.
    pub(crate) villages: HashMap<VillageId, Village>,
    /// Membership rows keyed by agent (one village per agent).
    pub(crate) members: HashMap<AgentId, VillageMember>,
    /// Communal resource ledger per village: item name to balance.
    pub(crate) resources: HashMap<VillageId, BTreeMap<String, u64>>,
    /// Village goals by id.
    pub(crate) goals: HashMap<GoalId, Goal>,
    /// The shared append-only event log, in insertion order.
    pub(crate) events: Vec<StoredEvent>,
    /// In-flight trades by id.
    pub(crate) trades: HashMap<TradeId, Trade>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_backend() {
        let store = Store::new();
        let other = store.clone();
        store.lock().unwrap().events.push(sample_event());
        assert_eq!(other.lock().unwrap().events.len(), 1);
    }

    fn sample_event() -> StoredEvent {
        StoredEvent {
            id: hamlet_types::EventId::new(),
            kind: hamlet_types::EventKind::Discovery,
            description: String::from("found a cave"),
            agent_id: None,
            village_id: None,
            metadata: serde_json::json!({}),
            recorded_at: chrono::Utc::now(),
        }
    }
}
