//! Village governance: elections, goals, and communal resources.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hamlet_store::{ResourceGrant, Store};
use hamlet_types::{
    AgentId, EventId, EventKind, Goal, GoalId, GoalStatus, Memory, MemoryKind, Personality,
    StoredEvent, VillageId, VillageRole, VoteChoice,
};
use rust_decimal::Decimal;
use tracing::info;

use crate::culture;
use crate::error::SocietyError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Trust assumed for an agent with no relationships yet (0.5).
fn default_trust() -> Decimal {
    Decimal::new(5, 1)
}

/// Weight of personality in a leadership score (0.7); trust carries the
/// remaining 0.3.
fn personality_weight() -> Decimal {
    Decimal::new(7, 1)
}

// ---------------------------------------------------------------------------
// Elections
// ---------------------------------------------------------------------------

/// Leadership aptitude from personality alone: ambition leads, then
/// sociability, work ethic, and empathy.
pub fn leadership_aptitude(personality: &Personality) -> Decimal {
    personality
        .ambition
        .saturating_mul(Decimal::new(4, 1))
        .saturating_add(personality.sociability.saturating_mul(Decimal::new(3, 1)))
        .saturating_add(personality.work_ethic.saturating_mul(Decimal::new(2, 1)))
        .saturating_add(personality.empathy.saturating_mul(Decimal::new(1, 1)))
}

/// Store-backed governance for all villages.
#[derive(Debug, Clone)]
pub struct GovernanceEngine {
    store: Store,
}

impl GovernanceEngine {
    /// Create an engine over the shared store.
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Elect a leader for the village.
    ///
    /// Each member scores `0.7 * aptitude + 0.3 * mean trust` (mean over
    /// the member's relationships, defaulting to 0.5 with none). Members
    /// are considered in join order and only a strictly higher score
    /// displaces the running winner, so ties resolve to the earliest
    /// joiner. The previous leader, if different, is demoted to member.
    ///
    /// # Errors
    ///
    /// Returns [`SocietyError::EmptyVillage`] if the village has no
    /// members, or [`SocietyError::Store`] on store failures.
    pub fn elect_leader(
        &self,
        village_id: VillageId,
        now: DateTime<Utc>,
    ) -> Result<AgentId, SocietyError> {
        let mut members = self.store.members(village_id)?;
        if members.is_empty() {
            return Err(SocietyError::EmptyVillage(village_id));
        }
        members.sort_by_key(|m| (m.joined_at, m.agent_id));

        let mut winner = None;
        let mut best_score = Decimal::ZERO;
        for member in &members {
            let personality = self.store.agent(member.agent_id)?.personality;
            let score = personality_weight()
                .saturating_mul(leadership_aptitude(&personality))
                .saturating_add(
                    Decimal::new(3, 1).saturating_mul(self.mean_trust(member.agent_id)?),
                );
            if winner.is_none() || score > best_score {
                winner = Some(member.agent_id);
                best_score = score;
            }
        }
        let Some(leader) = winner else {
            return Err(SocietyError::EmptyVillage(village_id));
        };

        for member in &members {
            if member.role == VillageRole::Leader && member.agent_id != leader {
                self.store
                    .set_member_role(village_id, member.agent_id, VillageRole::Member)?;
            }
        }
        self.store
            .set_member_role(village_id, leader, VillageRole::Leader)?;
        info!(village_id = %village_id, %leader, score = %best_score, "leader elected");

        self.store.append_event(StoredEvent {
            id: EventId::new(),
            kind: EventKind::LeaderElected,
            description: String::from("a leader was elected"),
            agent_id: Some(leader),
            village_id: Some(village_id),
            metadata: serde_json::json!({ "score": best_score }),
            recorded_at: now,
        })?;
        let participants = u32::try_from(members.len()).unwrap_or(u32::MAX);
        let importance = culture::historical_importance(EventKind::LeaderElected, participants);
        for member in &members {
            self.store.append_memory(
                Memory::new(
                    member.agent_id,
                    MemoryKind::Historical,
                    serde_json::json!({ "village": village_id, "leader": leader }),
                    importance,
                    now,
                )
                .with_related(leader),
            )?;
        }
        Ok(leader)
    }

    fn mean_trust(&self, agent: AgentId) -> Result<Decimal, SocietyError> {
        let relationships = self.store.relationships_of(agent)?;
        if relationships.is_empty() {
            return Ok(default_trust());
        }
        let total = relationships
            .iter()
            .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.trust));
        Ok(total
            .checked_div(Decimal::from(relationships.len()))
            .unwrap_or(default_trust()))
    }

    // -----------------------------------------------------------------------
    // Goals
    // -----------------------------------------------------------------------

    /// Propose a goal for the village.
    ///
    /// # Errors
    ///
    /// Returns [`SocietyError::Store`] on store failures.
    pub fn propose_goal(
        &self,
        village_id: VillageId,
        proposer: AgentId,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Goal, SocietyError> {
        let goal = Goal {
            id: GoalId::new(),
            village_id,
            proposer,
            description: description.into(),
            status: GoalStatus::Proposed,
            votes: BTreeMap::new(),
            created_at: now,
        };
        self.store.create_goal(goal.clone())?;
        self.store.append_event(StoredEvent {
            id: EventId::new(),
            kind: EventKind::GoalProposed,
            description: goal.description.clone(),
            agent_id: Some(proposer),
            village_id: Some(village_id),
            metadata: serde_json::json!({ "goal_id": goal.id }),
            recorded_at: now,
        })?;
        Ok(goal)
    }

    /// Record one member's vote and re-tally the goal.
    ///
    /// A goal resolves once at least half the membership has voted: 60%
    /// yes among cast votes adopts it, anything less rejects it. Until
    /// quorum it stays open, and re-votes replace prior ballots.
    ///
    /// # Errors
    ///
    /// Returns [`SocietyError::Store`] on store failures.
    pub fn vote(
        &self,
        goal_id: GoalId,
        voter: AgentId,
        choice: VoteChoice,
        now: DateTime<Utc>,
    ) -> Result<GoalStatus, SocietyError> {
        let goal = self.store.cast_vote(goal_id, voter, choice)?;
        if goal.status != GoalStatus::Proposed {
            return Ok(goal.status);
        }
        let members = self.store.members(goal.village_id)?.len();
        let total = goal.votes.len();
        let yes = goal
            .votes
            .values()
            .filter(|&&v| v == VoteChoice::Yes)
            .count();

        // Quorum: votes cast >= half the membership.
        if total.saturating_mul(2) < members {
            return Ok(GoalStatus::Proposed);
        }
        // Supermajority: yes votes >= 60% of votes cast.
        let status = if yes.saturating_mul(5) >= total.saturating_mul(3) {
            GoalStatus::Active
        } else {
            GoalStatus::Rejected
        };
        self.store.set_goal_status(goal_id, status)?;
        if status == GoalStatus::Active {
            self.store.append_event(StoredEvent {
                id: EventId::new(),
                kind: EventKind::GoalApproved,
                description: goal.description,
                agent_id: Some(goal.proposer),
                village_id: Some(goal.village_id),
                metadata: serde_json::json!({ "goal_id": goal.id, "yes": yes, "total": total }),
                recorded_at: now,
            })?;
        }
        Ok(status)
    }

    // -----------------------------------------------------------------------
    // Communal resources
    // -----------------------------------------------------------------------

    /// Contribute items to the village pool, logging the act of sharing.
    ///
    /// # Errors
    ///
    /// Returns [`SocietyError::Store`] on store failures.
    pub fn contribute(
        &self,
        village_id: VillageId,
        agent: AgentId,
        item: &str,
        amount: u64,
        now: DateTime<Utc>,
    ) -> Result<u64, SocietyError> {
        let balance = self.store.contribute_resource(village_id, item, amount)?;
        self.store.append_event(StoredEvent {
            id: EventId::new(),
            kind: EventKind::ResourceShared,
            description: format!("{amount} {item} added to the common pool"),
            agent_id: Some(agent),
            village_id: Some(village_id),
            metadata: serde_json::json!({ "item": item, "amount": amount, "balance": balance }),
            recorded_at: now,
        })?;
        Ok(balance)
    }

    /// Draw items from the village pool, up to the available balance.
    ///
    /// # Errors
    ///
    /// Returns [`SocietyError::Store`] on store failures.
    pub fn request(
        &self,
        village_id: VillageId,
        item: &str,
        amount: u64,
    ) -> Result<ResourceGrant, SocietyError> {
        Ok(self.store.request_resource(village_id, item, amount)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use hamlet_types::{Agent, AgentStatus, CultureStyle, Position, Village};

    use super::*;

    fn spawn(store: &Store, name: &str, personality: Personality) -> AgentId {
        let now = Utc::now();
        let agent = Agent {
            id: AgentId::new(),
            name: name.to_owned(),
            personality,
            created_at: now,
            retired: false,
        };
        let id = agent.id;
        store
            .insert_agent(agent, AgentStatus::full(id, Position::new(0.0, 0.0), now))
            .unwrap();
        id
    }

    fn village_with(store: &Store, founders: &[AgentId]) -> VillageId {
        let now = Utc::now();
        store
            .create_village(
                Village {
                    id: VillageId::new(),
                    name: String::from("Stonebrook"),
                    center: Position::new(0.0, 0.0),
                    radius: 50.0,
                    population: 0,
                    culture: CultureStyle::Emerging,
                    founded_at: now,
                },
                founders,
                now,
            )
            .unwrap()
            .id
    }

    fn trait_heavy(ambition: Decimal) -> Personality {
        let n = Decimal::new(5, 1);
        Personality::new(n, n, ambition, n, n, n, n, n)
    }

    #[test]
    fn most_ambitious_member_wins_the_election() {
        let store = Store::new();
        let modest = spawn(&store, "Ada", trait_heavy(Decimal::new(2, 1)));
        let driven = spawn(&store, "Bo", trait_heavy(Decimal::ONE));
        let village = village_with(&store, &[modest, driven]);

        let engine = GovernanceEngine::new(store.clone());
        let leader = engine.elect_leader(village, Utc::now()).unwrap();
        assert_eq!(leader, driven);

        let roles: BTreeMap<AgentId, VillageRole> = store
            .members(village)
            .unwrap()
            .into_iter()
            .map(|m| (m.agent_id, m.role))
            .collect();
        assert_eq!(roles.get(&driven), Some(&VillageRole::Leader));
        assert_eq!(roles.get(&modest), Some(&VillageRole::Member));
        // Every member remembers the election.
        assert_eq!(store.memory_count(modest, Some(MemoryKind::Historical)).unwrap(), 1);
    }

    #[test]
    fn tied_scores_keep_the_earliest_joiner() {
        let store = Store::new();
        let first = spawn(&store, "Cy", Personality::neutral());
        let second = spawn(&store, "Dot", Personality::neutral());
        let village = village_with(&store, &[first, second]);

        let engine = GovernanceEngine::new(store);
        let leader = engine.elect_leader(village, Utc::now()).unwrap();
        // Same join time: the pair key order (agent id) breaks the tie,
        // and a tie on score never displaces the first candidate.
        assert_eq!(leader, first.min(second));
    }

    #[test]
    fn goal_needs_quorum_then_supermajority() {
        let store = Store::new();
        let ids: Vec<AgentId> = (0..4)
            .map(|i| spawn(&store, &format!("Agent{i}"), Personality::neutral()))
            .collect();
        let village = village_with(&store, &ids);
        let engine = GovernanceEngine::new(store);
        let now = Utc::now();
        let goal = engine
            .propose_goal(village, ids[0], "raise a granary", now)
            .unwrap();

        // One vote of four members: no quorum yet.
        assert_eq!(
            engine.vote(goal.id, ids[0], VoteChoice::Yes, now).unwrap(),
            GoalStatus::Proposed
        );
        // Second vote reaches quorum; 2/2 yes is over 60%.
        assert_eq!(
            engine.vote(goal.id, ids[1], VoteChoice::Yes, now).unwrap(),
            GoalStatus::Active
        );
    }

    #[test]
    fn split_vote_at_quorum_rejects() {
        let store = Store::new();
        let ids: Vec<AgentId> = (0..4)
            .map(|i| spawn(&store, &format!("Voter{i}"), Personality::neutral()))
            .collect();
        let village = village_with(&store, &ids);
        let engine = GovernanceEngine::new(store);
        let now = Utc::now();
        let goal = engine
            .propose_goal(village, ids[0], "dig a moat", now)
            .unwrap();

        assert_eq!(
            engine.vote(goal.id, ids[0], VoteChoice::Yes, now).unwrap(),
            GoalStatus::Proposed
        );
        // 1 yes of 2 cast = 50%, under the 60% bar.
        assert_eq!(
            engine.vote(goal.id, ids[1], VoteChoice::No, now).unwrap(),
            GoalStatus::Rejected
        );
    }

    #[test]
    fn contributions_are_logged_as_sharing() {
        let store = Store::new();
        let a = spawn(&store, "Eve", Personality::neutral());
        let village = village_with(&store, &[a]);
        let engine = GovernanceEngine::new(store.clone());
        let now = Utc::now();

        engine.contribute(village, a, "wheat", 12, now).unwrap();
        let grant = engine.request(village, "wheat", 20).unwrap();
        assert_eq!(grant.granted, 12);
        assert_eq!(grant.missing, 8);
        assert!(
            !store
                .recent_events(Some(EventKind::ResourceShared), Some(village), 5)
                .unwrap()
                .is_empty()
        );
    }
}
