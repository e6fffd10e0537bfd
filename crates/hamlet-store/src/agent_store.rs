//! Agent identity, status, and emotional time series operations.

use chrono::{DateTime, Utc};
use hamlet_types::{Agent, AgentId, AgentStatus, EmotionalState};
use tracing::debug;

use crate::backend::Store;
use crate::error::StoreError;

impl Store {
    /// Register a new agent with its initial status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateName`] if another live agent already
    /// uses the name.
    pub fn insert_agent(&self, agent: Agent, status: AgentStatus) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let taken = inner
            .agents
            .values()
            .any(|a| !a.retired && a.name == agent.name);
        if taken {
            return Err(StoreError::DuplicateName(agent.name));
        }
        debug!(agent_id = %agent.id, name = %agent.name, "agent registered");
        inner.statuses.insert(agent.id, status);
        inner.agents.insert(agent.id, agent);
        Ok(())
    }

    /// Fetch one agent by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AgentNotFound`] if the id is unknown.
    pub fn agent(&self, id: AgentId) -> Result<Agent, StoreError> {
        let inner = self.lock()?;
        inner
            .agents
            .get(&id)
            .cloned()
            .ok_or(StoreError::AgentNotFound(id))
    }

    /// All non-retired agents, in name order for stable iteration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn agents(&self) -> Result<Vec<Agent>, StoreError> {
        let inner = self.lock()?;
        let mut out: Vec<Agent> = inner.agents.values().filter(|a| !a.retired).cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    /// Soft-delete an agent. Its memories and relationships stay intact.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AgentNotFound`] if the id is unknown.
    pub fn retire_agent(&self, id: AgentId) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let agent = inner
            .agents
            .get_mut(&id)
            .ok_or(StoreError::AgentNotFound(id))?;
        agent.retired = true;
        debug!(agent_id = %id, "agent retired");
        Ok(())
    }

    /// Fetch the latest status row for an agent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StatusNotFound`] if no status was ever written.
    pub fn status(&self, id: AgentId) -> Result<AgentStatus, StoreError> {
        let inner = self.lock()?;
        inner
            .statuses
            .get(&id)
            .cloned()
            .ok_or(StoreError::StatusNotFound(id))
    }

    /// Status rows for every non-retired agent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn statuses(&self) -> Result<Vec<AgentStatus>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .statuses
            .values()
            .filter(|s| inner.agents.get(&s.agent_id).is_some_and(|a| !a.retired))
            .cloned()
            .collect())
    }

    /// Overwrite an agent's status row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AgentNotFound`] if the agent is unknown.
    pub fn write_status(&self, status: AgentStatus) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.agents.contains_key(&status.agent_id) {
            return Err(StoreError::AgentNotFound(status.agent_id));
        }
        inner.statuses.insert(status.agent_id, status);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Emotions
    // -----------------------------------------------------------------------

    /// Append a row to an agent's emotional time series.
    ///
    /// Rows are append-only; history is never rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AgentNotFound`] if the agent is unknown.
    pub fn append_emotions(&self, id: AgentId, state: EmotionalState) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.agents.contains_key(&id) {
            return Err(StoreError::AgentNotFound(id));
        }
        inner.emotions.entry(id).or_default().push(state);
        Ok(())
    }

    /// The most recent emotional row, or a neutral state if none exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn latest_emotions(
        &self,
        id: AgentId,
        now: DateTime<Utc>,
    ) -> Result<EmotionalState, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .emotions
            .get(&id)
            .and_then(|rows| rows.last())
            .cloned()
            .unwrap_or_else(|| EmotionalState::neutral(now)))
    }
}
