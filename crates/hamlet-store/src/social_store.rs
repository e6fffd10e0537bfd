//! Memory and relationship-graph operations.

use chrono::{DateTime, Utc};
use hamlet_types::{score, AgentId, Memory, MemoryKind, PairKey, Relationship};
use rust_decimal::Decimal;
use tracing::trace;

use crate::backend::Store;
use crate::error::StoreError;

impl Store {
    // -----------------------------------------------------------------------
    // Memories
    // -----------------------------------------------------------------------

    /// Append a memory to its owner's history.
    ///
    /// Memories are append-only and never hard-deleted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AgentNotFound`] if the owner is unknown.
    pub fn append_memory(&self, memory: Memory) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.agents.contains_key(&memory.agent_id) {
            return Err(StoreError::AgentNotFound(memory.agent_id));
        }
        inner.memories.entry(memory.agent_id).or_default().push(memory);
        Ok(())
    }

    /// The newest memories for an agent, newest first, optionally filtered
    /// by kind.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn recent_memories(
        &self,
        id: AgentId,
        kind: Option<MemoryKind>,
        limit: usize,
    ) -> Result<Vec<Memory>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .memories
            .get(&id)
            .map(|rows| {
                rows.iter()
                    .rev()
                    .filter(|m| kind.is_none_or(|k| m.kind == k))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    /// How many memories an agent holds, optionally filtered by kind.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn memory_count(&self, id: AgentId, kind: Option<MemoryKind>) -> Result<usize, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .memories
            .get(&id)
            .map(|rows| {
                rows.iter()
                    .filter(|m| kind.is_none_or(|k| m.kind == k))
                    .count()
            })
            .unwrap_or_default())
    }

    // -----------------------------------------------------------------------
    // Relationships
    // -----------------------------------------------------------------------

    /// The stored relationship between two agents, if any interaction has
    /// ever been recorded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn relationship(&self, a: AgentId, b: AgentId) -> Result<Option<Relationship>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.relationships.get(&PairKey::new(a, b)).cloned())
    }

    /// Every relationship the agent participates in.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn relationships_of(&self, id: AgentId) -> Result<Vec<Relationship>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .relationships
            .values()
            .filter(|r| r.pair.involves(id))
            .cloned()
            .collect())
    }

    /// A snapshot of the whole relationship graph.
    ///
    /// Used by village-formation scans that need a consistent view of every
    /// edge at once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn all_relationships(&self) -> Result<Vec<Relationship>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.relationships.values().cloned().collect())
    }

    /// Apply a bounded delta to the relationship between two agents.
    ///
    /// Creates the edge lazily at zero affinity and zero trust. The whole
    /// read-modify-write happens in one critical section: affinity is
    /// clamped to [-0.5, 1.5], trust to [0, 1.5], the interaction counter
    /// increments by one, and `last_interaction` advances. Returns the
    /// updated edge.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn apply_relationship_delta(
        &self,
        a: AgentId,
        b: AgentId,
        affinity_delta: Decimal,
        trust_delta: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Relationship, StoreError> {
        let mut inner = self.lock()?;
        let key = PairKey::new(a, b);
        let edge = inner
            .relationships
            .entry(key)
            .or_insert_with(|| Relationship::new(key, now));
        edge.affinity = score::affinity(edge.affinity.saturating_add(affinity_delta));
        edge.trust = score::trust(edge.trust.saturating_add(trust_delta));
        edge.interactions = edge.interactions.saturating_add(1);
        edge.last_interaction = now;
        trace!(
            affinity = %edge.affinity,
            trust = %edge.trust,
            interactions = edge.interactions,
            "relationship updated"
        );
        Ok(edge.clone())
    }
}
