//! Persistence layer for the Hamlet simulation.
//!
//! A deliberately narrow store: higher layers express everything through
//! small CRUD-shaped calls, and every call is atomic with respect to every
//! other call. All simulation semantics (utility scoring, trust gates,
//! clustering, elections) live above this crate; the one rule enforced
//! here is bounds -- relationship deltas clamp, counters only grow, the
//! resource ledger never goes negative.
//!
//! # Modules
//!
//! - [`backend`] -- The [`Store`] handle and the in-memory state it guards
//! - [`agent_store`] -- Agents, status rows, emotional time series
//! - [`social_store`] -- Memories and the relationship graph
//! - [`village_store`] -- Villages, membership, communal resources, goals
//! - [`event_store`] -- The shared append-only event log
//! - [`trade_store`] -- Ephemeral in-flight trades
//! - [`error`] -- [`StoreError`]

pub mod agent_store;
pub mod backend;
pub mod error;
pub mod event_store;
pub mod social_store;
pub mod trade_store;
pub mod village_store;

pub use backend::Store;
pub use error::StoreError;
pub use village_store::ResourceGrant;
