//! Per-agent behavior for the Hamlet simulation.
//!
//! Everything an individual agent does lives here: scoring and choosing
//! actions, feeling the consequences, talking to neighbors, picking up
//! skills, and haggling. Societal structures built on top of these
//! behaviors (villages, governance, culture) live in `hamlet-society`.
//!
//! # Modules
//!
//! - [`decision`] -- Personality-weighted utility scoring and action
//!   selection
//! - [`emotion`] -- Ambient drift and action-outcome emotional deltas
//! - [`social`] -- Interactions, alliances, gifts, teaching, conflicts,
//!   help, and knowledge sharing
//! - [`skills`] -- Skill levels derived from memory history
//! - [`trade`] -- Valuation, fairness, and negotiation
//! - [`error`] -- [`AgentError`]

pub mod decision;
pub mod emotion;
pub mod error;
pub mod skills;
pub mod social;
pub mod trade;

pub use decision::{ActionChoice, AgentAction, UtilityScore, actions_in, choose_action, score_categories};
pub use error::AgentError;
pub use social::{ConflictReport, InteractionReport, SocialEngine, TeachingReport};
pub use trade::{TradeDecision, TradeEngine};
