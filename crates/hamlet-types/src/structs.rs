//! Core entity structs for the Hamlet simulation.
//!
//! Covers agents (identity, status, personality, emotions), memories, the
//! relationship graph, villages and membership, traditions, trades, goals,
//! and the shared event log.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{
    CultureStyle, EventKind, GoalStatus, MemoryKind, TradeStatus, TraditionKind, VillageRole,
    VoteChoice,
};
use crate::ids::{AgentId, EventId, GoalId, TradeId, VillageId};
use crate::score;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A point on the horizontal world plane.
///
/// The simulation only reasons about x/z; elevation belongs to the external
/// world driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// East-west coordinate.
    pub x: f64,
    /// North-south coordinate.
    pub z: f64,
}

impl Position {
    /// Create a position.
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx.hypot(dz)
    }
}

// ---------------------------------------------------------------------------
// Personality
// ---------------------------------------------------------------------------

/// Immutable personality vector assigned at agent creation.
///
/// Each trait is a [`Decimal`] in [0, 1]. Traits influence decision making,
/// trade valuation, and elections but never change over the agent's
/// lifetime. Construction clamps every field once so downstream readers
/// never have to default or re-validate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    /// Drive to explore and seek novelty.
    pub curiosity: Decimal,
    /// Desire for interaction versus solitude.
    pub sociability: Decimal,
    /// Drive toward status, wealth, and leadership.
    pub ambition: Decimal,
    /// Tendency toward conflict and competition.
    pub aggression: Decimal,
    /// Care for other agents' wellbeing.
    pub empathy: Decimal,
    /// Drive to build and make things.
    pub creativity: Decimal,
    /// Willingness to take uncertain actions.
    pub risk_tolerance: Decimal,
    /// Preference for productive work versus rest.
    pub work_ethic: Decimal,
}

impl Personality {
    /// Build a personality, clamping every trait to [0, 1].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        curiosity: Decimal,
        sociability: Decimal,
        ambition: Decimal,
        aggression: Decimal,
        empathy: Decimal,
        creativity: Decimal,
        risk_tolerance: Decimal,
        work_ethic: Decimal,
    ) -> Self {
        Self {
            curiosity: score::unit(curiosity),
            sociability: score::unit(sociability),
            ambition: score::unit(ambition),
            aggression: score::unit(aggression),
            empathy: score::unit(empathy),
            creativity: score::unit(creativity),
            risk_tolerance: score::unit(risk_tolerance),
            work_ethic: score::unit(work_ethic),
        }
    }

    /// The neutral personality: every trait at 0.5.
    ///
    /// Used wherever a personality is missing rather than erroring.
    pub fn neutral() -> Self {
        let n = score::neutral();
        Self::new(n, n, n, n, n, n, n, n)
    }
}

// ---------------------------------------------------------------------------
// Emotional state
// ---------------------------------------------------------------------------

/// One row of an agent's emotional time series.
///
/// Each field is a [`Decimal`] in [0, 1]. Rows are append-only in the
/// store; only the latest row is authoritative for decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalState {
    /// Need for food.
    pub hunger: Decimal,
    /// Sense of being out of danger.
    pub safety: Decimal,
    /// Need for company.
    pub loneliness: Decimal,
    /// Need for stimulation.
    pub boredom: Decimal,
    /// Appetite for novelty.
    pub curiosity: Decimal,
    /// Contentment with recent outcomes.
    pub satisfaction: Decimal,
    /// Accumulated strain.
    pub stress: Decimal,
    /// When this row was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl EmotionalState {
    /// A neutral starting state: every field at 0.5.
    pub fn neutral(recorded_at: DateTime<Utc>) -> Self {
        let n = score::neutral();
        Self {
            hunger: n,
            safety: n,
            loneliness: n,
            boredom: n,
            curiosity: n,
            satisfaction: n,
            stress: n,
            recorded_at,
        }
    }

    /// Clamp every field back into [0, 1].
    ///
    /// Called after any batch of deltas so no field drifts out of range.
    pub fn clamp_all(&mut self) {
        self.hunger = score::unit(self.hunger);
        self.safety = score::unit(self.safety);
        self.loneliness = score::unit(self.loneliness);
        self.boredom = score::unit(self.boredom);
        self.curiosity = score::unit(self.curiosity);
        self.satisfaction = score::unit(self.satisfaction);
        self.stress = score::unit(self.stress);
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Immutable agent identity record.
///
/// Created once at first simulation entry. Never deleted while referenced
/// by relationships or memories; `retired` soft-deletes instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier.
    pub id: AgentId,
    /// Display name, unique across the simulation.
    pub name: String,
    /// Immutable personality vector.
    pub personality: Personality,
    /// Wall-clock creation time.
    pub created_at: DateTime<Utc>,
    /// Soft-delete flag; retired agents are skipped by scans.
    pub retired: bool,
}

/// Mutable physical state of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    /// The agent this status belongs to.
    pub agent_id: AgentId,
    /// Current world position.
    pub position: Position,
    /// Health points on a 0-20 scale.
    pub health: Decimal,
    /// Food points on a 0-20 scale.
    pub food: Decimal,
    /// Experience level.
    pub level: u32,
    /// When this status was last written.
    pub updated_at: DateTime<Utc>,
}

impl AgentStatus {
    /// Full health and food on the 0-20 scale.
    pub fn full(agent_id: AgentId, position: Position, updated_at: DateTime<Utc>) -> Self {
        Self {
            agent_id,
            position,
            health: Decimal::from(20_u32),
            food: Decimal::from(20_u32),
            level: 0,
            updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// A single memory owned by exactly one agent.
///
/// Memories are append-only and never hard-deleted; importance and age
/// jointly determine relevance when querying, which keeps the historical
/// narrative intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// The owning agent.
    pub agent_id: AgentId,
    /// Category of this memory.
    pub kind: MemoryKind,
    /// Structured payload describing what happened.
    pub content: serde_json::Value,
    /// Retention importance in [0, 1].
    pub importance: Decimal,
    /// Another agent involved, if any.
    pub related_agent: Option<AgentId>,
    /// Where it happened, if known.
    pub location: Option<Position>,
    /// When it happened.
    pub recorded_at: DateTime<Utc>,
}

impl Memory {
    /// Create a memory, clamping importance to [0, 1].
    pub fn new(
        agent_id: AgentId,
        kind: MemoryKind,
        content: serde_json::Value,
        importance: Decimal,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            agent_id,
            kind,
            content,
            importance: score::unit(importance),
            related_agent: None,
            location: None,
            recorded_at,
        }
    }

    /// Attach a related agent.
    #[must_use]
    pub const fn with_related(mut self, other: AgentId) -> Self {
        self.related_agent = Some(other);
        self
    }

    /// Attach a location.
    #[must_use]
    pub const fn with_location(mut self, location: Position) -> Self {
        self.location = Some(location);
        self
    }
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

/// Canonical unordered pair of agent ids.
///
/// Relationships are directional in storage terms but symmetric in meaning,
/// so the pair key always orders the two ids the same way regardless of
/// which side initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    /// The smaller id of the pair.
    pub first: AgentId,
    /// The larger id of the pair.
    pub second: AgentId,
}

impl PairKey {
    /// Build the canonical key for two agents, in either order.
    pub fn new(a: AgentId, b: AgentId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Whether the given agent is one of the pair.
    pub fn involves(&self, agent: AgentId) -> bool {
        self.first == agent || self.second == agent
    }

    /// The other member of the pair, if `agent` is one of them.
    pub fn other(&self, agent: AgentId) -> Option<AgentId> {
        if self.first == agent {
            Some(self.second)
        } else if self.second == agent {
            Some(self.first)
        } else {
            None
        }
    }
}

/// Accumulated affinity and trust between two agents.
///
/// Created lazily on first interaction. `interactions` strictly increases;
/// affinity and trust accumulate via bounded, clamped deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Canonical pair key.
    pub pair: PairKey,
    /// Accumulated like/dislike, clamped to [-0.5, 1.5].
    pub affinity: Decimal,
    /// Accumulated reliability, clamped to [0, 1.5].
    pub trust: Decimal,
    /// Number of interactions; never decreases.
    pub interactions: u64,
    /// When the pair last interacted.
    pub last_interaction: DateTime<Utc>,
}

impl Relationship {
    /// A fresh relationship with zero accumulation.
    pub fn new(pair: PairKey, now: DateTime<Utc>) -> Self {
        Self {
            pair,
            affinity: Decimal::ZERO,
            trust: Decimal::ZERO,
            interactions: 0,
            last_interaction: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Villages
// ---------------------------------------------------------------------------

/// A settlement formed by a qualifying cluster of agents.
///
/// Villages are never deleted automatically; an empty one is "abandoned"
/// but the record persists for history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Village {
    /// Unique identifier.
    pub id: VillageId,
    /// Generated settlement name.
    pub name: String,
    /// Territory center.
    pub center: Position,
    /// Territory radius.
    pub radius: f64,
    /// Current member count (kept in sync by the store).
    pub population: u32,
    /// Dominant cultural style.
    pub culture: CultureStyle,
    /// When the village was founded.
    pub founded_at: DateTime<Utc>,
}

/// Membership row linking an agent to a village with a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VillageMember {
    /// The village.
    pub village_id: VillageId,
    /// The member agent.
    pub agent_id: AgentId,
    /// The member's role.
    pub role: VillageRole,
    /// When the agent joined.
    pub joined_at: DateTime<Utc>,
}

/// A recurring, regularly spaced behavior detected from a village's
/// event history. Derived on each culture reassessment, never stored as a
/// first-class mutable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tradition {
    /// The behavior pattern.
    pub kind: TraditionKind,
    /// How many qualifying occurrences were observed.
    pub frequency: u32,
    /// Whether the occurrences were evenly spaced.
    pub regular: bool,
    /// How many distinct agents participated.
    pub participants: u32,
}

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

/// A named stack of items used in trades and gifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Catalogue item name.
    pub item: String,
    /// Stack size.
    pub count: u32,
}

impl ItemStack {
    /// Create a stack.
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }
}

/// An in-flight trade negotiation.
///
/// Ephemeral: garbage-collected after a timeout if never resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique identifier.
    pub id: TradeId,
    /// The agent making the offer.
    pub proposer: AgentId,
    /// The agent being offered to.
    pub target: AgentId,
    /// Items offered by the proposer.
    pub offer: Vec<ItemStack>,
    /// Items requested from the target.
    pub request: Vec<ItemStack>,
    /// Value of the offer from the target's perspective.
    pub offer_value: Decimal,
    /// Value of the request from the proposer's perspective.
    pub request_value: Decimal,
    /// Offer value divided by request value.
    pub fairness: Decimal,
    /// Negotiation status.
    pub status: TradeStatus,
    /// When the offer was made.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// An entry in the shared, append-only event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Unique identifier.
    pub id: EventId,
    /// Type tag.
    pub kind: EventKind,
    /// Human-readable description.
    pub description: String,
    /// The acting agent, if any.
    pub agent_id: Option<AgentId>,
    /// The village concerned, if any.
    pub village_id: Option<VillageId>,
    /// Structured extras.
    pub metadata: serde_json::Value,
    /// When the event happened.
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

/// A village goal moving through proposal and voting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier.
    pub id: GoalId,
    /// The village this goal belongs to.
    pub village_id: VillageId,
    /// Who proposed it.
    pub proposer: AgentId,
    /// What is being proposed.
    pub description: String,
    /// Current status.
    pub status: GoalStatus,
    /// One vote per member, replaced on re-vote.
    pub votes: BTreeMap<AgentId, VoteChoice>,
    /// When it was proposed.
    pub created_at: DateTime<Utc>,
}
