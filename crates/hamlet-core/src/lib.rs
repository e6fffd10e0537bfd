//! Simulation runtime for the Hamlet world.
//!
//! This crate wires the behavioral engines into a running system:
//! typed YAML configuration, the per-agent decision cycle, the loop
//! scheduler, the world-driver seam, best-effort messaging, offline
//! time compression, and the read models the observer API serves.
//!
//! # Modules
//!
//! - [`config`] -- `hamlet-config.yaml` structures and loader
//! - [`cycle`] -- observe/decide/act/feel cycle with a busy guard
//! - [`scheduler`] -- the action, emotion, society, and sweep loops
//! - [`driver`] -- [`WorldDriver`] seam and the headless [`NullDriver`]
//! - [`executor`] -- maps chosen actions onto driver capability calls
//! - [`registry`] -- agent lifecycle (register/unregister)
//! - [`relay`] -- best-effort agent-to-agent messaging
//! - [`offline`] -- catch-up across engine downtime
//! - [`snapshot`] -- observer read models

pub mod config;
pub mod cycle;
pub mod driver;
pub mod error;
pub mod executor;
pub mod offline;
pub mod registry;
pub mod relay;
pub mod scheduler;
pub mod snapshot;

pub use config::{ConfigError, SimConfig};
pub use cycle::{AgentCycle, CycleOutcome, CyclePhase};
pub use driver::{DriverError, NullDriver, WorldDriver};
pub use error::CoreError;
pub use offline::{OfflineReport, catch_up};
pub use registry::AgentRegistry;
pub use relay::{LocalRelay, MessageRelay};
pub use scheduler::Scheduler;
