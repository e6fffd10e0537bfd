//! Agent spawner for seeding the world.
//!
//! At engine start the spawner creates N agents with names drawn from a
//! fixed pool without replacement, fully random personalities, full
//! vitals, and starting positions scattered around the origin. Agents
//! enter the world through the lifecycle registry.

use chrono::Utc;
use hamlet_core::AgentRegistry;
use hamlet_types::{Agent, AgentId, AgentStatus, Personality, Position};
use rand::Rng;
use rust_decimal::Decimal;

use crate::error::EngineError;

/// Built-in pool of agent names. The spawner picks randomly without
/// replacement to keep names unique.
const NAME_POOL: &[&str] = &[
    "Alder", "Birch", "Cedar", "Dusk", "Ember", "Fern", "Grove", "Haze",
    "Iris", "Juniper", "Kestrel", "Lark", "Moss", "Nettle", "Oak", "Pine",
    "Quill", "Reed", "Sage", "Thorn", "Umber", "Vale", "Wren", "Yarrow",
    "Zephyr", "Ash", "Brook", "Clay", "Dawn", "Elm", "Flint", "Gale",
    "Heath", "Ivy", "Jay", "Kale", "Lichen", "Maple", "Nyx", "Onyx",
    "Pebble", "Quartz", "Raven", "Sable", "Terra", "Urchin", "Vole",
    "Willow", "Xylem", "Yew",
];

/// Radius around the origin inside which seed agents start.
const SPAWN_RADIUS: f64 = 100.0;

/// A fully random personality: every trait uniform in [0, 1] at two
/// decimal places.
fn random_personality<R: Rng>(rng: &mut R) -> Personality {
    let mut trait_roll = || Decimal::new(rng.random_range(0..=100), 2);
    Personality::new(
        trait_roll(),
        trait_roll(),
        trait_roll(),
        trait_roll(),
        trait_roll(),
        trait_roll(),
        trait_roll(),
        trait_roll(),
    )
}

/// Spawn `count` seed agents through the registry.
///
/// # Errors
///
/// Returns [`EngineError::Spawner`] if the name pool runs out, or a
/// registry error if registration fails.
pub fn spawn_seed_agents<R: Rng>(
    registry: &AgentRegistry,
    count: u32,
    rng: &mut R,
) -> Result<Vec<AgentId>, EngineError> {
    let mut names: Vec<&str> = NAME_POOL.to_vec();
    let mut spawned = Vec::new();
    let now = Utc::now();

    for _ in 0..count {
        if names.is_empty() {
            return Err(EngineError::Spawner(format!(
                "name pool exhausted after {} agents",
                spawned.len()
            )));
        }
        let name = names.swap_remove(rng.random_range(0..names.len()));
        let agent = Agent {
            id: AgentId::new(),
            name: name.to_owned(),
            personality: random_personality(rng),
            created_at: now,
            retired: false,
        };
        let position = Position::new(
            rng.random_range(-SPAWN_RADIUS..SPAWN_RADIUS),
            rng.random_range(-SPAWN_RADIUS..SPAWN_RADIUS),
        );
        let status = AgentStatus::full(agent.id, position, now);
        let id = registry.register(agent, status)?;
        spawned.push(id);
    }
    Ok(spawned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hamlet_store::Store;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn spawns_the_requested_count_with_unique_names() {
        let store = Store::new();
        let registry = AgentRegistry::new(store.clone());
        let mut rng = StdRng::seed_from_u64(11);
        let spawned = spawn_seed_agents(&registry, 10, &mut rng).unwrap();
        assert_eq!(spawned.len(), 10);

        let agents = store.agents().unwrap();
        assert_eq!(agents.len(), 10);
        let mut names: Vec<&str> = agents.iter().map(|a| a.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn personalities_stay_in_unit_range() {
        let store = Store::new();
        let registry = AgentRegistry::new(store.clone());
        let mut rng = StdRng::seed_from_u64(12);
        spawn_seed_agents(&registry, 20, &mut rng).unwrap();
        for agent in store.agents().unwrap() {
            let p = &agent.personality;
            for value in [
                p.curiosity,
                p.sociability,
                p.ambition,
                p.aggression,
                p.empathy,
                p.creativity,
                p.risk_tolerance,
                p.work_ethic,
            ] {
                assert!(value >= Decimal::ZERO && value <= Decimal::ONE);
            }
        }
    }

    #[test]
    fn exhausting_the_name_pool_is_an_error() {
        let registry = AgentRegistry::new(Store::new());
        let mut rng = StdRng::seed_from_u64(13);
        let count = u32::try_from(NAME_POOL.len()).unwrap();
        let err = spawn_seed_agents(&registry, count + 1, &mut rng);
        assert!(matches!(err, Err(EngineError::Spawner(_))));
    }
}
