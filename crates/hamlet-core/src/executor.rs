//! Translates chosen actions into world-driver capability calls.
//!
//! The decision engine picks abstract actions; this module grounds them
//! in the driver's verbs (find a block, walk, equip, interact, chat).
//! An action "fails" when the world has nothing to offer (no matching
//! block in range), which is a normal outcome distinct from a driver
//! error.

use std::f64::consts::TAU;

use hamlet_agents::AgentAction;
use hamlet_types::{AgentId, Position};
use rand::Rng;

use crate::driver::{DriverError, WorldDriver};

/// How far the executor searches for harvestable blocks.
const GATHER_RANGE: f64 = 32.0;

/// How far a single exploration leg travels.
const EXPLORE_DISTANCE: f64 = 48.0;

/// How far an agent runs when fleeing.
const FLEE_DISTANCE: f64 = 24.0;

fn offset(from: Position, bearing: f64, distance: f64) -> Position {
    Position::new(
        from.x + bearing.cos() * distance,
        from.z + bearing.sin() * distance,
    )
}

/// Find, approach, and work a block. `false` when nothing is in range.
async fn harvest(
    driver: &dyn WorldDriver,
    agent: AgentId,
    matcher: &str,
    tool: Option<&str>,
) -> Result<bool, DriverError> {
    let Some(target) = driver.find_nearest_block(agent, matcher, GATHER_RANGE).await? else {
        return Ok(false);
    };
    if let Some(tool) = tool {
        driver.equip(agent, tool).await?;
    }
    driver.move_to(agent, target).await?;
    driver.interact(agent, target).await?;
    Ok(true)
}

async fn travel<R: Rng>(
    driver: &dyn WorldDriver,
    agent: AgentId,
    from: Position,
    distance: f64,
    rng: &mut R,
) -> Result<bool, DriverError> {
    let bearing = rng.random_range(0.0..TAU);
    driver.move_to(agent, offset(from, bearing, distance)).await?;
    Ok(true)
}

/// Execute one action through the driver.
///
/// Returns whether the action succeeded in the world. Purely internal
/// actions (resting, reflecting) succeed without touching the driver.
///
/// # Errors
///
/// Propagates [`DriverError`] when the world connection itself fails;
/// the caller decides whether that degrades to a failed action.
pub async fn execute<R: Rng>(
    driver: &dyn WorldDriver,
    agent: AgentId,
    position: Position,
    action: AgentAction,
    rng: &mut R,
) -> Result<bool, DriverError> {
    match action {
        AgentAction::Eat => {
            driver.equip(agent, "food").await?;
            driver.interact(agent, position).await?;
            Ok(true)
        }
        AgentAction::Flee => travel(driver, agent, position, FLEE_DISTANCE, rng).await,
        AgentAction::Shelter => match driver
            .find_nearest_block(agent, "shelter", GATHER_RANGE)
            .await?
        {
            Some(target) => {
                driver.move_to(agent, target).await?;
                Ok(true)
            }
            None => Ok(false),
        },
        AgentAction::ExploreArea | AgentAction::ScoutResources | AgentAction::MapTerrain => {
            travel(driver, agent, position, EXPLORE_DISTANCE, rng).await
        }
        AgentAction::Greet => {
            driver.chat(agent, "hello there!").await?;
            Ok(true)
        }
        AgentAction::Chat => {
            driver.chat(agent, "how has your day been?").await?;
            Ok(true)
        }
        AgentAction::OfferHelp => {
            driver.chat(agent, "need a hand with anything?").await?;
            Ok(true)
        }
        AgentAction::ShareNews => {
            driver.chat(agent, "you will not believe what I found").await?;
            Ok(true)
        }
        AgentAction::BuildShelter | AgentAction::ImproveCamp => {
            driver.equip(agent, "wood").await?;
            driver.interact(agent, position).await?;
            Ok(true)
        }
        AgentAction::CraftTool => {
            driver.equip(agent, "materials").await?;
            driver.interact(agent, position).await?;
            Ok(true)
        }
        AgentAction::GatherWood => harvest(driver, agent, "log", Some("axe")).await,
        AgentAction::GatherStone => harvest(driver, agent, "stone", Some("pickaxe")).await,
        AgentAction::GatherFood => harvest(driver, agent, "crops", None).await,
        AgentAction::MineOre => harvest(driver, agent, "ore", Some("pickaxe")).await,
        AgentAction::OfferTrade => {
            driver.chat(agent, "anyone open to a trade?").await?;
            Ok(true)
        }
        AgentAction::VisitMarket => travel(driver, agent, position, EXPLORE_DISTANCE, rng).await,
        AgentAction::Heal
        | AgentAction::Idle
        | AgentAction::Sleep
        | AgentAction::OrganizeInventory
        | AgentAction::Reflect => Ok(true),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures::FutureExt;
    use futures::future::BoxFuture;
    use hamlet_types::WorldContext;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::driver::NullDriver;

    /// A world with no blocks in it at all.
    struct BarrenDriver;

    impl WorldDriver for BarrenDriver {
        fn observe(&self, _agent: AgentId) -> BoxFuture<'_, Result<WorldContext, DriverError>> {
            futures::future::ready(Ok(WorldContext::calm_daytime())).boxed()
        }

        fn find_nearest_block<'a>(
            &'a self,
            _agent: AgentId,
            _matcher: &'a str,
            _max_distance: f64,
        ) -> BoxFuture<'a, Result<Option<Position>, DriverError>> {
            futures::future::ready(Ok(None)).boxed()
        }

        fn move_to(
            &self,
            _agent: AgentId,
            _goal: Position,
        ) -> BoxFuture<'_, Result<(), DriverError>> {
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

    #[tokio::test]
    async fn gathering_succeeds_when_blocks_exist() {
        let mut rng = StdRng::seed_from_u64(1);
        let ok = execute(
            &NullDriver,
            AgentId::new(),
            Position::new(0.0, 0.0),
            AgentAction::GatherWood,
            &mut rng,
        )
        .await
        .unwrap();
        assert!(ok);
    }

    #[tokio::test]
    async fn gathering_fails_in_a_barren_world() {
        let mut rng = StdRng::seed_from_u64(2);
        let ok = execute(
            &BarrenDriver,
            AgentId::new(),
            Position::new(0.0, 0.0),
            AgentAction::MineOre,
            &mut rng,
        )
        .await
        .unwrap();
        assert!(!ok);

        // Resting needs no world at all.
        let rested = execute(
            &BarrenDriver,
            AgentId::new(),
            Position::new(0.0, 0.0),
            AgentAction::Sleep,
            &mut rng,
        )
        .await
        .unwrap();
        assert!(rested);
    }
}
