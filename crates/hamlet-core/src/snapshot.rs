//! Read models served by the observer API.
//!
//! These projections flatten store state into JSON-friendly shapes. They
//! are assembled on demand; nothing here mutates the store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hamlet_agents::skills;
use hamlet_store::Store;
use hamlet_types::{
    AgentId, CultureStyle, EmotionalState, Memory, Personality, Position, SkillCategory,
    Tradition, VillageId, VillageRole,
};
use hamlet_society::detect_traditions;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::CoreError;

/// How many recent memories an agent detail view carries.
const DETAIL_MEMORY_LIMIT: usize = 20;

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

/// One row of the agent list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSummary {
    /// Agent id.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Last known position.
    pub position: Position,
    /// Health points on the 0-20 scale.
    pub health: Decimal,
    /// Food points on the 0-20 scale.
    pub food: Decimal,
    /// Experience level.
    pub level: u32,
    /// Village membership, if any.
    pub village_id: Option<VillageId>,
}

/// Full detail view of one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentDetail {
    /// The summary row.
    #[serde(flatten)]
    pub summary: AgentSummary,
    /// The agent's fixed temperament.
    pub personality: Personality,
    /// Latest emotional state.
    pub emotions: EmotionalState,
    /// Derived skill levels by skill name.
    pub skills: BTreeMap<&'static str, Decimal>,
    /// Most recent memories, newest first.
    pub recent_memories: Vec<Memory>,
}

/// One member row inside a village view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberView {
    /// The member.
    pub agent_id: AgentId,
    /// Display name.
    pub name: String,
    /// Assigned role.
    pub role: VillageRole,
    /// When the member joined.
    pub joined_at: DateTime<Utc>,
}

/// A village with its membership, pool, and recognized traditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VillageView {
    /// Village id.
    pub id: VillageId,
    /// Generated name.
    pub name: String,
    /// Territory center.
    pub center: Position,
    /// Territory radius.
    pub radius: f64,
    /// Live member count.
    pub population: u32,
    /// Dominant cultural style.
    pub culture: CultureStyle,
    /// Founding time.
    pub founded_at: DateTime<Utc>,
    /// Current members.
    pub members: Vec<MemberView>,
    /// Communal resource balances.
    pub resources: BTreeMap<String, u64>,
    /// Traditions detected in the village's event history.
    pub traditions: Vec<Tradition>,
}

/// One edge of an agent's relationship graph, annotated with the
/// counterpart's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipView {
    /// The other agent on the edge.
    pub other: AgentId,
    /// The other agent's name.
    pub name: String,
    /// Bounded affinity score.
    pub affinity: Decimal,
    /// Bounded trust score.
    pub trust: Decimal,
    /// Total recorded interactions.
    pub interactions: u64,
    /// When the pair last interacted.
    pub last_interaction: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Summary rows for every live agent, sorted by name.
///
/// # Errors
///
/// Returns [`CoreError::Store`] on store failures.
pub fn agent_summaries(store: &Store) -> Result<Vec<AgentSummary>, CoreError> {
    let mut out = Vec::new();
    for agent in store.agents()? {
        let status = store.status(agent.id)?;
        let village_id = store.member_of(agent.id)?.map(|m| m.village_id);
        out.push(AgentSummary {
            id: agent.id,
            name: agent.name,
            position: status.position,
            health: status.health,
            food: status.food,
            level: status.level,
            village_id,
        });
    }
    Ok(out)
}

/// Full detail for one agent.
///
/// # Errors
///
/// Returns [`CoreError::Store`] if the agent is unknown or reads fail.
pub fn agent_detail(
    store: &Store,
    id: AgentId,
    now: DateTime<Utc>,
) -> Result<AgentDetail, CoreError> {
    let agent = store.agent(id)?;
    let status = store.status(id)?;
    let village_id = store.member_of(id)?.map(|m| m.village_id);

    let mut skill_levels = BTreeMap::new();
    for category in [
        SkillCategory::Mining,
        SkillCategory::Building,
        SkillCategory::Farming,
        SkillCategory::Combat,
        SkillCategory::Trading,
        SkillCategory::Exploration,
    ] {
        skill_levels.insert(
            skills::skill_name(category),
            skills::skill_level(store, id, category)?,
        );
    }

    Ok(AgentDetail {
        summary: AgentSummary {
            id,
            name: agent.name,
            position: status.position,
            health: status.health,
            food: status.food,
            level: status.level,
            village_id,
        },
        personality: agent.personality,
        emotions: store.latest_emotions(id, now)?,
        skills: skill_levels,
        recent_memories: store.recent_memories(id, None, DETAIL_MEMORY_LIMIT)?,
    })
}

/// Every village with members, resources, and traditions.
///
/// # Errors
///
/// Returns [`CoreError::Store`] on store failures.
pub fn village_views(store: &Store) -> Result<Vec<VillageView>, CoreError> {
    let mut out = Vec::new();
    for village in store.villages()? {
        let mut members = Vec::new();
        for row in store.members(village.id)? {
            members.push(MemberView {
                agent_id: row.agent_id,
                name: store.agent(row.agent_id)?.name,
                role: row.role,
                joined_at: row.joined_at,
            });
        }
        members.sort_by(|a, b| (a.joined_at, a.agent_id).cmp(&(b.joined_at, b.agent_id)));
        let traditions = detect_traditions(&store.village_events(village.id)?);
        out.push(VillageView {
            id: village.id,
            name: village.name,
            center: village.center,
            radius: village.radius,
            population: village.population,
            culture: village.culture,
            founded_at: village.founded_at,
            members,
            resources: store.resources(village.id)?,
            traditions,
        });
    }
    Ok(out)
}

/// An agent's relationship edges, strongest trust first.
///
/// # Errors
///
/// Returns [`CoreError::Store`] on store failures.
pub fn relationship_views(store: &Store, id: AgentId) -> Result<Vec<RelationshipView>, CoreError> {
    let mut out = Vec::new();
    for edge in store.relationships_of(id)? {
        let other = edge.pair.other(id).unwrap_or(id);
        out.push(RelationshipView {
            other,
            name: store.agent(other)?.name,
            affinity: edge.affinity,
            trust: edge.trust,
            interactions: edge.interactions,
            last_interaction: edge.last_interaction,
        });
    }
    out.sort_by(|a, b| b.trust.cmp(&a.trust));
    Ok(out)
}
