//! Agent lifecycle registry.
//!
//! The registry is the only component that registers and unregisters
//! agents. Everything else holds plain [`AgentId`]s and resolves them
//! here each time, so no long-lived handle can outlive the agent it
//! points at. Unregistering retires the agent in place; memories and
//! relationships that reference it stay intact.

use hamlet_store::Store;
use hamlet_types::{Agent, AgentId, AgentStatus};
use tracing::info;

use crate::error::CoreError;

/// Owns agent lifecycle over the shared store.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    store: Store,
}

impl AgentRegistry {
    /// Create a registry over the shared store.
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Register a new agent with its starting status.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the name is taken or the store
    /// rejects the insert.
    pub fn register(&self, agent: Agent, status: AgentStatus) -> Result<AgentId, CoreError> {
        let id = agent.id;
        let name = agent.name.clone();
        self.store.insert_agent(agent, status)?;
        info!(agent_id = %id, name, "agent registered");
        Ok(id)
    }

    /// Retire an agent. The record stays; the roster no longer lists it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the agent does not exist.
    pub fn unregister(&self, id: AgentId) -> Result<(), CoreError> {
        self.store.retire_agent(id)?;
        info!(agent_id = %id, "agent unregistered");
        Ok(())
    }

    /// Resolve an id to the agent record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the agent does not exist.
    pub fn resolve(&self, id: AgentId) -> Result<Agent, CoreError> {
        Ok(self.store.agent(id)?)
    }

    /// Ids of every live (non-retired) agent.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if the roster read fails.
    pub fn live(&self) -> Result<Vec<AgentId>, CoreError> {
        Ok(self.store.agents()?.into_iter().map(|a| a.id).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use hamlet_types::{Personality, Position};

    use super::*;

    fn make_agent(name: &str) -> (Agent, AgentStatus) {
        let now = Utc::now();
        let agent = Agent {
            id: AgentId::new(),
            name: name.to_owned(),
            personality: Personality::neutral(),
            created_at: now,
            retired: false,
        };
        let status = AgentStatus::full(agent.id, Position::new(0.0, 0.0), now);
        (agent, status)
    }

    #[test]
    fn unregistering_removes_from_the_roster_but_not_the_record() {
        let registry = AgentRegistry::new(Store::new());
        let (agent, status) = make_agent("Ada");
        let id = registry.register(agent, status).unwrap();
        assert_eq!(registry.live().unwrap(), vec![id]);

        registry.unregister(id).unwrap();
        assert!(registry.live().unwrap().is_empty());
        // The record itself survives for history.
        assert!(registry.resolve(id).is_ok());
    }

    #[test]
    fn resolving_an_unknown_id_fails() {
        let registry = AgentRegistry::new(Store::new());
        assert!(registry.resolve(AgentId::new()).is_err());
    }
}
