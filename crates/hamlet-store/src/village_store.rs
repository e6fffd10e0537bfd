//! Village, membership, communal-resource, and goal operations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hamlet_types::{
    AgentId, CultureStyle, Goal, GoalId, GoalStatus, Village, VillageId, VillageMember,
    VillageRole, VoteChoice,
};
use tracing::{debug, info};

use crate::backend::Store;
use crate::error::StoreError;

/// Outcome of a communal resource request.
///
/// The ledger never goes into debt; a request for more than the balance is
/// partially granted and the shortfall reported so the caller can plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceGrant {
    /// How much was handed out.
    pub granted: u64,
    /// How much of the request could not be covered.
    pub missing: u64,
}

impl Store {
    // -----------------------------------------------------------------------
    // Villages and membership
    // -----------------------------------------------------------------------

    /// Persist a newly founded village with its founding members.
    ///
    /// Founders already belonging to another village are skipped; the
    /// village's population reflects the members actually enrolled.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn create_village(
        &self,
        mut village: Village,
        founders: &[AgentId],
        now: DateTime<Utc>,
    ) -> Result<Village, StoreError> {
        let mut inner = self.lock()?;
        let mut enrolled = 0_u32;
        for &agent_id in founders {
            if inner.members.contains_key(&agent_id) {
                continue;
            }
            inner.members.insert(
                agent_id,
                VillageMember {
                    village_id: village.id,
                    agent_id,
                    role: VillageRole::Member,
                    joined_at: now,
                },
            );
            enrolled = enrolled.saturating_add(1);
        }
        village.population = enrolled;
        info!(village_id = %village.id, name = %village.name, population = enrolled, "village created");
        inner.villages.insert(village.id, village.clone());
        Ok(village)
    }

    /// Fetch one village by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VillageNotFound`] if the id is unknown.
    pub fn village(&self, id: VillageId) -> Result<Village, StoreError> {
        let inner = self.lock()?;
        inner
            .villages
            .get(&id)
            .cloned()
            .ok_or(StoreError::VillageNotFound(id))
    }

    /// All villages, in founding order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn villages(&self) -> Result<Vec<Village>, StoreError> {
        let inner = self.lock()?;
        let mut out: Vec<Village> = inner.villages.values().cloned().collect();
        out.sort_by_key(|v| v.founded_at);
        Ok(out)
    }

    /// The membership row for an agent, if it belongs to a village.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn member_of(&self, agent_id: AgentId) -> Result<Option<VillageMember>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.members.get(&agent_id).cloned())
    }

    /// All membership rows of one village.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn members(&self, village_id: VillageId) -> Result<Vec<VillageMember>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .members
            .values()
            .filter(|m| m.village_id == village_id)
            .cloned()
            .collect())
    }

    /// Enroll an agent into a village and bump the population count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyMember`] if the agent belongs to any
    /// village, or [`StoreError::VillageNotFound`] for an unknown village.
    pub fn add_member(
        &self,
        village_id: VillageId,
        agent_id: AgentId,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.members.contains_key(&agent_id) {
            return Err(StoreError::AlreadyMember(agent_id));
        }
        let village = inner
            .villages
            .get_mut(&village_id)
            .ok_or(StoreError::VillageNotFound(village_id))?;
        village.population = village.population.saturating_add(1);
        inner.members.insert(
            agent_id,
            VillageMember {
                village_id,
                agent_id,
                role: VillageRole::Member,
                joined_at: now,
            },
        );
        debug!(village_id = %village_id, agent_id = %agent_id, "member joined");
        Ok(())
    }

    /// Remove an agent from its village, decrementing the population.
    ///
    /// Returns the village's remaining population, or `None` if the agent
    /// was not a member of anything.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn remove_member(&self, agent_id: AgentId) -> Result<Option<u32>, StoreError> {
        let mut inner = self.lock()?;
        let Some(row) = inner.members.remove(&agent_id) else {
            return Ok(None);
        };
        let remaining = inner.villages.get_mut(&row.village_id).map(|v| {
            v.population = v.population.saturating_sub(1);
            v.population
        });
        Ok(remaining)
    }

    /// Change a member's role.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AgentNotFound`] if the agent is not a member
    /// of the given village.
    pub fn set_member_role(
        &self,
        village_id: VillageId,
        agent_id: AgentId,
        role: VillageRole,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let row = inner
            .members
            .get_mut(&agent_id)
            .filter(|m| m.village_id == village_id)
            .ok_or(StoreError::AgentNotFound(agent_id))?;
        row.role = role;
        Ok(())
    }

    /// Update a village's dominant culture style.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VillageNotFound`] if the id is unknown.
    pub fn set_culture(&self, id: VillageId, culture: CultureStyle) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let village = inner
            .villages
            .get_mut(&id)
            .ok_or(StoreError::VillageNotFound(id))?;
        village.culture = culture;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Communal resources
    // -----------------------------------------------------------------------

    /// Add to a village's communal balance of one item.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VillageNotFound`] if the village is unknown.
    pub fn contribute_resource(
        &self,
        village_id: VillageId,
        item: &str,
        amount: u64,
    ) -> Result<u64, StoreError> {
        let mut inner = self.lock()?;
        if !inner.villages.contains_key(&village_id) {
            return Err(StoreError::VillageNotFound(village_id));
        }
        let ledger = inner.resources.entry(village_id).or_default();
        let balance = ledger.entry(item.to_owned()).or_insert(0);
        *balance = balance.saturating_add(amount);
        Ok(*balance)
    }

    /// Draw from a village's communal balance of one item.
    ///
    /// Grants only up to the available balance; the ledger never goes
    /// negative.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VillageNotFound`] if the village is unknown.
    pub fn request_resource(
        &self,
        village_id: VillageId,
        item: &str,
        amount: u64,
    ) -> Result<ResourceGrant, StoreError> {
        let mut inner = self.lock()?;
        if !inner.villages.contains_key(&village_id) {
            return Err(StoreError::VillageNotFound(village_id));
        }
        let ledger = inner.resources.entry(village_id).or_default();
        let balance = ledger.entry(item.to_owned()).or_insert(0);
        let granted = amount.min(*balance);
        *balance = balance.saturating_sub(granted);
        Ok(ResourceGrant {
            granted,
            missing: amount.saturating_sub(granted),
        })
    }

    /// Snapshot of a village's communal resource balances.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn resources(&self, village_id: VillageId) -> Result<BTreeMap<String, u64>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.resources.get(&village_id).cloned().unwrap_or_default())
    }

    // -----------------------------------------------------------------------
    // Goals
    // -----------------------------------------------------------------------

    /// Persist a newly proposed goal.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VillageNotFound`] if the goal's village is
    /// unknown.
    pub fn create_goal(&self, goal: Goal) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.villages.contains_key(&goal.village_id) {
            return Err(StoreError::VillageNotFound(goal.village_id));
        }
        inner.goals.insert(goal.id, goal);
        Ok(())
    }

    /// Fetch one goal by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GoalNotFound`] if the id is unknown.
    pub fn goal(&self, id: GoalId) -> Result<Goal, StoreError> {
        let inner = self.lock()?;
        inner.goals.get(&id).cloned().ok_or(StoreError::GoalNotFound(id))
    }

    /// All goals of one village.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn goals(&self, village_id: VillageId) -> Result<Vec<Goal>, StoreError> {
        let inner = self.lock()?;
        let mut out: Vec<Goal> = inner
            .goals
            .values()
            .filter(|g| g.village_id == village_id)
            .cloned()
            .collect();
        out.sort_by_key(|g| g.created_at);
        Ok(out)
    }

    /// Record one member's vote on a goal, replacing any prior vote by the
    /// same agent. Returns the updated goal.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GoalNotFound`] if the goal is unknown.
    pub fn cast_vote(
        &self,
        goal_id: GoalId,
        voter: AgentId,
        choice: VoteChoice,
    ) -> Result<Goal, StoreError> {
        let mut inner = self.lock()?;
        let goal = inner
            .goals
            .get_mut(&goal_id)
            .ok_or(StoreError::GoalNotFound(goal_id))?;
        goal.votes.insert(voter, choice);
        Ok(goal.clone())
    }

    /// Move a goal to a new lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GoalNotFound`] if the goal is unknown.
    pub fn set_goal_status(&self, goal_id: GoalId, status: GoalStatus) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let goal = inner
            .goals
            .get_mut(&goal_id)
            .ok_or(StoreError::GoalNotFound(goal_id))?;
        goal.status = status;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hamlet_types::Position;

    use super::*;

    fn sample_village(now: DateTime<Utc>) -> Village {
        Village {
            id: VillageId::new(),
            name: String::from("Oakrest"),
            center: Position::new(10.0, -4.0),
            radius: 50.0,
            population: 0,
            culture: CultureStyle::Emerging,
            founded_at: now,
        }
    }

    #[test]
    fn founders_in_other_villages_are_skipped() {
        let store = Store::new();
        let now = Utc::now();
        let (a, b, c) = (AgentId::new(), AgentId::new(), AgentId::new());
        let first = store
            .create_village(sample_village(now), &[a, b], now)
            .unwrap();
        assert_eq!(first.population, 2);

        let second = store
            .create_village(sample_village(now), &[b, c], now)
            .unwrap();
        assert_eq!(second.population, 1);
        assert_eq!(store.member_of(b).unwrap().unwrap().village_id, first.id);
    }

    #[test]
    fn resource_requests_never_overdraw() {
        let store = Store::new();
        let now = Utc::now();
        let village = store.create_village(sample_village(now), &[], now).unwrap();
        store.contribute_resource(village.id, "oak_log", 10).unwrap();
        let grant = store.request_resource(village.id, "oak_log", 25).unwrap();
        assert_eq!(grant, ResourceGrant { granted: 10, missing: 15 });
        assert_eq!(store.resources(village.id).unwrap().get("oak_log"), Some(&0));
    }

    #[test]
    fn membership_is_exclusive_and_population_tracks() {
        let store = Store::new();
        let now = Utc::now();
        let village = store.create_village(sample_village(now), &[], now).unwrap();
        let agent = AgentId::new();
        store.add_member(village.id, agent, now).unwrap();
        assert!(matches!(
            store.add_member(village.id, agent, now),
            Err(StoreError::AlreadyMember(_))
        ));
        assert_eq!(store.remove_member(agent).unwrap(), Some(0));
        assert_eq!(store.remove_member(agent).unwrap(), None);
    }

    #[test]
    fn revotes_replace_rather_than_stack() {
        let store = Store::new();
        let now = Utc::now();
        let village = store.create_village(sample_village(now), &[], now).unwrap();
        let voter = AgentId::new();
        let goal = Goal {
            id: GoalId::new(),
            village_id: village.id,
            proposer: voter,
            description: String::from("build a granary"),
            status: GoalStatus::Proposed,
            votes: std::collections::BTreeMap::new(),
            created_at: now,
        };
        store.create_goal(goal.clone()).unwrap();
        store.cast_vote(goal.id, voter, VoteChoice::No).unwrap();
        let updated = store.cast_vote(goal.id, voter, VoteChoice::Yes).unwrap();
        assert_eq!(updated.votes.len(), 1);
        assert_eq!(updated.votes.get(&voter), Some(&VoteChoice::Yes));
    }
}
