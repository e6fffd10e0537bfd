//! World driver abstraction.
//!
//! The runtime never talks to a game world directly. A [`WorldDriver`]
//! exposes the capability verbs a world connection provides: perception
//! ([`WorldContext`]), block search, movement, equipping, interaction,
//! and chat. The [`crate::executor`] module translates chosen actions
//! into sequences of these calls; the shipped [`NullDriver`] runs the
//! simulation headless, which is enough for tests and for
//! socially-driven runs with no world attached.
//!
//! Callers own the timeout: the cycle wraps each executed action in
//! `tokio::time::timeout` and treats expiry as a failed action.

use futures::FutureExt;
use futures::future::BoxFuture;
use hamlet_types::{AgentId, Position, WorldContext};

/// Errors a world driver can surface.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The backing world is not reachable.
    #[error("world unreachable: {0}")]
    Unreachable(String),

    /// The driver rejected the call for this agent.
    #[error("call rejected for agent {0}")]
    Rejected(AgentId),
}

/// Connection to whatever world the agents inhabit.
///
/// Implementations are expected to be cheap to call concurrently; the
/// scheduler fans cycles out across agents. Boxed futures keep the trait
/// object-safe so the runtime can hold `Arc<dyn WorldDriver>`.
pub trait WorldDriver: Send + Sync {
    /// Observe the world from one agent's point of view.
    ///
    /// This is also the vitals and position read: the returned context
    /// carries health, food, time of day, and surroundings.
    fn observe(&self, agent: AgentId) -> BoxFuture<'_, Result<WorldContext, DriverError>>;

    /// Locate the nearest block matching `matcher` within `max_distance`.
    ///
    /// `None` means nothing matched in range; that is a normal outcome,
    /// not an error.
    fn find_nearest_block<'a>(
        &'a self,
        agent: AgentId,
        matcher: &'a str,
        max_distance: f64,
    ) -> BoxFuture<'a, Result<Option<Position>, DriverError>>;

    /// Walk the agent toward a goal position.
    fn move_to(&self, agent: AgentId, goal: Position) -> BoxFuture<'_, Result<(), DriverError>>;

    /// Equip a named item or tool.
    fn equip<'a>(
        &'a self,
        agent: AgentId,
        item: &'a str,
    ) -> BoxFuture<'a, Result<(), DriverError>>;

    /// Use whatever is at the target position (harvest, open, activate).
    fn interact(&self, agent: AgentId, target: Position)
    -> BoxFuture<'_, Result<(), DriverError>>;

    /// Say something out loud in the world.
    fn chat<'a>(
        &'a self,
        agent: AgentId,
        message: &'a str,
    ) -> BoxFuture<'a, Result<(), DriverError>>;
}

/// A driver with no world behind it.
///
/// Every observation is a calm daytime scene, block searches always
/// find a match at the agent's feet, and every verb succeeds instantly.
/// Decisions and their emotional consequences still flow, so the social
/// simulation runs unimpeded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDriver;

impl WorldDriver for NullDriver {
    fn observe(&self, _agent: AgentId) -> BoxFuture<'_, Result<WorldContext, DriverError>> {
        futures::future::ready(Ok(WorldContext::calm_daytime())).boxed()
    }

    fn find_nearest_block<'a>(
        &'a self,
        _agent: AgentId,
        _matcher: &'a str,
        _max_distance: f64,
    ) -> BoxFuture<'a, Result<Option<Position>, DriverError>> {
        futures::future::ready(Ok(Some(Position::new(0.0, 0.0)))).boxed()
    }

    fn move_to(&self, _agent: AgentId, _goal: Position) -> BoxFuture<'_, Result<(), DriverError>> {
        futures::future::ready(Ok(())).boxed()
    }

    fn equip<'a>(
        &'a self,
        _agent: AgentId,
        _item: &'a str,
    ) -> BoxFuture<'a, Result<(), DriverError>> {
        futures::future::ready(Ok(())).boxed()
    }

    fn interact(
        &self,
        _agent: AgentId,
        _target: Position,
    ) -> BoxFuture<'_, Result<(), DriverError>> {
        futures::future::ready(Ok(())).boxed()
    }

    fn chat<'a>(
        &'a self,
        _agent: AgentId,
        _message: &'a str,
    ) -> BoxFuture<'a, Result<(), DriverError>> {
        futures::future::ready(Ok(())).boxed()
    }
}
