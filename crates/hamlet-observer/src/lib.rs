//! Read-only HTTP API over the live simulation.
//!
//! The observer exposes the world to dashboards and curious humans
//! without ever mutating it: agent rosters and detail views, villages
//! with their members and traditions, the event log, and per-agent
//! relationship graphs.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
