//! Enumeration types for the Hamlet simulation.
//!
//! Covers action categories, memory and event taxonomies, village roles,
//! culture styles, tradition kinds, and the small fixed vocabularies used
//! by social interactions, trades, and governance.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Action selection
// ---------------------------------------------------------------------------

/// The seven fixed categories the decision engine scores each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    /// Eating, fleeing, sheltering, healing.
    Survival,
    /// Mapping terrain and finding new areas or resources.
    Exploration,
    /// Greeting, chatting, helping, forming alliances.
    Social,
    /// Construction and crafting.
    Building,
    /// Wood, stone, ore, and food collection.
    Gathering,
    /// Offering trades and visiting markets.
    Trading,
    /// Idling, sleeping, organizing, reflecting.
    Resting,
}

impl ActionCategory {
    /// All categories, in scoring order.
    pub const ALL: [Self; 7] = [
        Self::Survival,
        Self::Exploration,
        Self::Social,
        Self::Building,
        Self::Gathering,
        Self::Trading,
        Self::Resting,
    ];

    /// Stable lowercase name used in logs and snapshots.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Survival => "survival",
            Self::Exploration => "exploration",
            Self::Social => "social",
            Self::Building => "building",
            Self::Gathering => "gathering",
            Self::Trading => "trading",
            Self::Resting => "resting",
        }
    }
}

impl core::fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Memories
// ---------------------------------------------------------------------------

/// Category of a stored memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    /// A social interaction with another agent.
    Interaction,
    /// Something new found in the world.
    Discovery,
    /// A milestone the agent reached.
    Achievement,
    /// A notable place (home, village, landmark).
    Location,
    /// A completed or rejected trade.
    Trade,
    /// A strong emotional episode.
    Emotion,
    /// A general world or village event.
    Event,
    /// A skill practice or teaching session.
    Skill,
    /// Village membership changes (founding, joining, roles).
    Village,
    /// A village-level historical event.
    Historical,
}

// ---------------------------------------------------------------------------
// Social interactions
// ---------------------------------------------------------------------------

/// The template-driven interaction types agents can initiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// A simple hello.
    Greeting,
    /// An invitation to trade.
    TradeOffer,
    /// An offer to help with a task.
    HelpOffer,
    /// Sharing a discovery with another agent.
    ShareDiscovery,
    /// Proposing a formal alliance.
    AllianceProposal,
}

/// How an interaction landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionOutcome {
    /// The full affinity/trust delta applies.
    Positive,
    /// A fractional penalty applies instead.
    Neutral,
}

/// Categories of disputes handled by conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Competing claims over resources.
    ResourceDispute,
    /// Competing claims over territory.
    TerritoryDispute,
    /// A personal slight between two agents.
    PersonalGrievance,
    /// Incompatible goals or values.
    IdeologyClash,
}

/// Kinds of knowledge agents share with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeKind {
    /// Where a resource can be found.
    ResourceLocation,
    /// A warning about a hazard.
    DangerWarning,
    /// How to craft something.
    CraftingRecipe,
    /// A plan or tactic.
    Strategy,
    /// A fresh discovery.
    Discovery,
    /// A personal anecdote.
    PersonalExperience,
}

/// Skill domains derived from memory history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    /// Ore and stone extraction.
    Mining,
    /// Construction and crafting.
    Building,
    /// Planting and harvesting.
    Farming,
    /// Fighting and defense.
    Combat,
    /// Negotiation and exchange.
    Trading,
    /// Travel and discovery.
    Exploration,
}

// ---------------------------------------------------------------------------
// Villages and governance
// ---------------------------------------------------------------------------

/// Role of an agent within a village.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VillageRole {
    /// The elected leader.
    Leader,
    /// A plain member.
    Member,
    /// Construction specialist.
    Builder,
    /// Food production specialist.
    Farmer,
    /// Defense specialist.
    Guard,
    /// Commerce specialist.
    Trader,
}

/// Dominant behavioral archetype assigned to a village.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CultureStyle {
    /// Newly founded, no dominant pattern yet.
    Emerging,
    /// No members or no behavioral signal; the quiet default.
    Peaceful,
    /// Construction-dominant.
    Builder,
    /// Discovery-dominant.
    Explorer,
    /// Commerce-dominant.
    Trader,
    /// Conflict-dominant.
    Warrior,
    /// Food-production-dominant.
    Agricultural,
}

/// Lifecycle status of a village goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Proposed, collecting votes.
    Proposed,
    /// Adopted by quorum and supermajority.
    Active,
    /// Finished.
    Completed,
    /// Explicitly dropped.
    Rejected,
}

/// A single vote on a village goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    /// In favor.
    Yes,
    /// Against.
    No,
}

// ---------------------------------------------------------------------------
// Culture
// ---------------------------------------------------------------------------

/// Recurring behavior patterns a village can develop into traditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraditionKind {
    /// Regular assembly around goal proposals.
    DailyGathering,
    /// Recurring market activity.
    TradeFair,
    /// Repeated group construction.
    CollaborativeBuilding,
    /// Habitual sharing of resources.
    ResourceSharing,
    /// Recurring expeditions.
    ExplorationExpedition,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Type tag for entries in the shared event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Two agents interacted socially.
    SocialInteraction,
    /// An alliance was formed.
    AllianceFormed,
    /// A conflict was resolved or escalated.
    ConflictResolved,
    /// A village was founded.
    VillageFounded,
    /// A village absorbed new members.
    VillageExpanded,
    /// A village reached zero members.
    VillageAbandoned,
    /// Offline growth of a village.
    VillageGrowth,
    /// A leader was elected.
    LeaderElected,
    /// A goal was proposed.
    GoalProposed,
    /// A goal reached quorum and supermajority.
    GoalApproved,
    /// A trade completed.
    TradeCompleted,
    /// Resources were shared within a village.
    ResourceShared,
    /// A construction finished.
    BuildCompleted,
    /// An exploration trip finished.
    ExplorationCompleted,
    /// A farm was planted or harvested.
    FarmWorked,
    /// A fight happened.
    CombatFought,
    /// A village's dominant culture changed.
    CulturalShift,
    /// A recurring behavior was recognized as a tradition.
    TraditionEstablished,
    /// Something rare was found (offline event pool).
    Discovery,
    /// The weather turned (offline event pool).
    Weather,
    /// An agent moved to a new area (offline event pool).
    Migration,
    /// Construction progressed (offline event pool).
    Construction,
    /// Relationships strengthened (offline event pool).
    Social,
}

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

/// Lifecycle status of a trade negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    /// Offered, awaiting evaluation.
    Proposed,
    /// Accepted and executed.
    Accepted,
    /// Declined by the target.
    Rejected,
}

// ---------------------------------------------------------------------------
// World context
// ---------------------------------------------------------------------------

/// Coarse time-of-day flag fed into utility scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// Daylight hours.
    Day,
    /// Night hours.
    Night,
}

/// Activities synthesized during offline catch-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfflineActivity {
    /// Collected resources.
    Gathering,
    /// Worked on constructions.
    Building,
    /// Wandered and mapped.
    Exploring,
    /// Did nothing in particular.
    Resting,
}
