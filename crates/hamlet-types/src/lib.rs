//! Shared type definitions for the Hamlet society simulation.
//!
//! This crate is the single source of truth for all types used across the
//! Hamlet workspace: identifiers, enumerations, entity structs, the
//! decision-input context, and relay message payloads.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (categories, kinds, statuses, roles)
//! - [`structs`] -- Core entity structs (agents, memories, relationships,
//!   villages, trades, goals, events)
//! - [`context`] -- Decision-input snapshot and relay message payloads
//! - [`score`] -- Clamped [`rust_decimal::Decimal`] score helpers

pub mod context;
pub mod enums;
pub mod ids;
pub mod score;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use context::{MessageEnvelope, RelayMessage, WorldContext};
pub use enums::{
    ActionCategory, ConflictKind, CultureStyle, EventKind, GoalStatus, InteractionKind,
    InteractionOutcome, KnowledgeKind, MemoryKind, OfflineActivity, SkillCategory, TimeOfDay,
    TradeStatus, TraditionKind, VillageRole, VoteChoice,
};
pub use ids::{AgentId, EventId, GoalId, MessageId, TradeId, VillageId};
pub use structs::{
    Agent, AgentStatus, EmotionalState, Goal, ItemStack, Memory, PairKey, Personality, Position,
    Relationship, StoredEvent, Trade, Tradition, Village, VillageMember,
};
