//! Offline time compression.
//!
//! When the engine comes back up after a gap, agents are assumed to have
//! kept living: needs grew, each agent pursued an activity matching its
//! temperament, restless ones wandered, and the world produced a trickle
//! of background events. The catch-up pass synthesizes all of that in
//! one shot so the world does not restart frozen in the past.

use chrono::{DateTime, Utc};
use hamlet_store::Store;
use hamlet_types::{
    Agent, EventId, EventKind, Memory, MemoryKind, OfflineActivity, StoredEvent,
};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::info;

use crate::config::OfflineSettings;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Gaps of an hour or less are absorbed silently.
const MIN_GAP_MINUTES: i64 = 60;

/// Per-hour hunger growth (0.05).
fn hunger_per_hour() -> Decimal {
    Decimal::new(5, 2)
}

/// Per-hour boredom growth (0.1).
fn boredom_per_hour() -> Decimal {
    Decimal::new(1, 1)
}

/// Per-hour loneliness growth (0.08).
fn loneliness_per_hour() -> Decimal {
    Decimal::new(8, 2)
}

/// Per-hour curiosity decay (0.02), floored at 0.3.
fn curiosity_decay_per_hour() -> Decimal {
    Decimal::new(2, 2)
}

/// Per-hour stress decay (0.05); time away is restful.
fn stress_decay_per_hour() -> Decimal {
    Decimal::new(5, 2)
}

/// Curiosity never decays below this (0.3).
fn curiosity_floor() -> Decimal {
    Decimal::new(3, 1)
}

/// Importance of synthesized offline memories (0.3).
fn offline_importance() -> Decimal {
    Decimal::new(3, 1)
}

/// Background event pool drawn from during world catch-up.
const WORLD_EVENT_POOL: [(EventKind, &str); 5] = [
    (EventKind::Discovery, "something unusual was found in the wilds"),
    (EventKind::Weather, "the weather turned while nobody watched"),
    (EventKind::Migration, "wildlife shifted to new grounds"),
    (EventKind::Construction, "half-built structures advanced"),
    (EventKind::Social, "bonds quietly deepened around the fires"),
];

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// What one catch-up pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineReport {
    /// Simulated offline hours (after the configured cap).
    pub hours: u64,
    /// Agents that were advanced.
    pub agents_processed: u32,
    /// Synthesized memories written.
    pub memories_written: u64,
    /// Villages that grew while unobserved.
    pub villages_grown: u32,
    /// Background world events generated.
    pub world_events: u32,
}

// ---------------------------------------------------------------------------
// Catch-up
// ---------------------------------------------------------------------------

/// Advance the whole world across an offline gap.
///
/// Returns `None` when the gap is an hour or less, or when catch-up is
/// disabled.
///
/// # Errors
///
/// Returns [`CoreError::Store`] if reading or writing state fails.
pub fn catch_up<R: Rng>(
    store: &Store,
    settings: &OfflineSettings,
    rng: &mut R,
    last_seen: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Option<OfflineReport>, CoreError> {
    if !settings.enabled {
        return Ok(None);
    }
    let minutes = now.signed_duration_since(last_seen).num_minutes();
    if minutes <= MIN_GAP_MINUTES {
        return Ok(None);
    }
    let hours_whole = u64::try_from(minutes.checked_div(60).unwrap_or(0))
        .unwrap_or(0)
        .min(settings.max_hours);
    let hours = Decimal::from(hours_whole);

    let mut report = OfflineReport {
        hours: hours_whole,
        agents_processed: 0,
        memories_written: 0,
        villages_grown: 0,
        world_events: 0,
    };

    for agent in store.agents()? {
        report.memories_written = report
            .memories_written
            .saturating_add(catch_up_agent(store, rng, &agent, hours, now)?);
        report.agents_processed = report.agents_processed.saturating_add(1);
    }

    catch_up_world(store, rng, hours, now, &mut report)?;

    info!(
        hours = report.hours,
        agents = report.agents_processed,
        memories = report.memories_written,
        world_events = report.world_events,
        "offline catch-up complete"
    );
    Ok(Some(report))
}

/// Advance one agent: needs, an activity, wandering, and vitals.
///
/// Returns how many memories were synthesized.
fn catch_up_agent<R: Rng>(
    store: &Store,
    rng: &mut R,
    agent: &Agent,
    hours: Decimal,
    now: DateTime<Utc>,
) -> Result<u64, CoreError> {
    // Needs grow while nobody tends them; strain fades.
    let mut emotions = store.latest_emotions(agent.id, now)?;
    emotions.hunger = emotions
        .hunger
        .saturating_add(hunger_per_hour().saturating_mul(hours));
    emotions.boredom = emotions
        .boredom
        .saturating_add(boredom_per_hour().saturating_mul(hours));
    emotions.loneliness = emotions
        .loneliness
        .saturating_add(loneliness_per_hour().saturating_mul(hours));
    emotions.curiosity = emotions
        .curiosity
        .saturating_sub(curiosity_decay_per_hour().saturating_mul(hours))
        .max(curiosity_floor());
    emotions.stress = emotions
        .stress
        .saturating_sub(stress_decay_per_hour().saturating_mul(hours));
    emotions.clamp_all();
    emotions.recorded_at = now;
    store.append_emotions(agent.id, emotions)?;

    let activity = roll_activity(rng, agent);
    let memory_budget = hours
        .saturating_mul(
            Decimal::new(5, 1)
                .saturating_add(agent.personality.work_ethic.saturating_mul(Decimal::new(5, 1))),
        )
        .floor()
        .to_u64()
        .unwrap_or(0);
    for _ in 0..memory_budget {
        store.append_memory(Memory::new(
            agent.id,
            MemoryKind::Event,
            serde_json::json!({ "offline": true, "activity": activity }),
            offline_importance(),
            now,
        ))?;
    }

    // Restless agents drift across the map while unobserved.
    let mut status = store.status(agent.id)?;
    if agent.personality.curiosity > Decimal::new(6, 1) {
        let reach = hours
            .saturating_mul(Decimal::from(10_u32))
            .saturating_mul(agent.personality.curiosity)
            .to_f64()
            .unwrap_or(0.0);
        let angle = rng.random_range(0.0..std::f64::consts::TAU);
        status.position.x += reach * angle.cos();
        status.position.z += reach * angle.sin();
    }

    // Vitals sag but never below a livable floor.
    let wear = Decimal::from(5_u32).min(hours.saturating_mul(Decimal::new(5, 1)));
    status.health = status.health.saturating_sub(wear).max(Decimal::from(10_u32));
    status.food = status.food.saturating_sub(hours).max(Decimal::from(5_u32));
    status.updated_at = now;
    store.write_status(status)?;

    Ok(memory_budget)
}

/// Weighted activity roll: industrious agents gather, creative ones
/// build, curious ones explore, the rest rest.
fn roll_activity<R: Rng>(rng: &mut R, agent: &Agent) -> OfflineActivity {
    let roll = rng.random::<f64>();
    let gather = agent
        .personality
        .work_ethic
        .saturating_mul(Decimal::new(4, 1));
    let build = gather.saturating_add(
        agent
            .personality
            .creativity
            .saturating_mul(Decimal::new(3, 1)),
    );
    let explore = build.saturating_add(
        agent
            .personality
            .curiosity
            .saturating_mul(Decimal::new(3, 1)),
    );
    if roll < gather.to_f64().unwrap_or(0.0) {
        OfflineActivity::Gathering
    } else if roll < build.to_f64().unwrap_or(0.0) {
        OfflineActivity::Building
    } else if roll < explore.to_f64().unwrap_or(0.0) {
        OfflineActivity::Exploring
    } else {
        OfflineActivity::Resting
    }
}

/// Villages and the wider world move on too.
fn catch_up_world<R: Rng>(
    store: &Store,
    rng: &mut R,
    hours: Decimal,
    now: DateTime<Utc>,
    report: &mut OfflineReport,
) -> Result<(), CoreError> {
    let days = hours.checked_div(Decimal::from(24_u32)).unwrap_or(Decimal::ZERO);

    let growth_chance = Decimal::new(1, 1)
        .saturating_mul(days)
        .to_f64()
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);
    for village in store.villages()? {
        if rng.random_bool(growth_chance) {
            store.append_event(StoredEvent {
                id: EventId::new(),
                kind: EventKind::VillageGrowth,
                description: format!("{} grew while unobserved", village.name),
                agent_id: None,
                village_id: Some(village.id),
                metadata: serde_json::json!({}),
                recorded_at: now,
            })?;
            report.villages_grown = report.villages_grown.saturating_add(1);
        }
    }

    let event_count = days
        .saturating_mul(Decimal::from(2_u32))
        .floor()
        .to_u32()
        .unwrap_or(0);
    for _ in 0..event_count {
        let Some((kind, description)) = WORLD_EVENT_POOL
            .get(rng.random_range(0..WORLD_EVENT_POOL.len()))
            .copied()
        else {
            continue;
        };
        store.append_event(StoredEvent {
            id: EventId::new(),
            kind,
            description: description.to_owned(),
            agent_id: None,
            village_id: None,
            metadata: serde_json::json!({ "offline": true }),
            recorded_at: now,
        })?;
        report.world_events = report.world_events.saturating_add(1);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Duration;
    use hamlet_types::{Agent, AgentId, AgentStatus, Personality, Position};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn spawn(store: &Store, name: &str, personality: Personality) -> AgentId {
        let now = Utc::now();
        let agent = Agent {
            id: AgentId::new(),
            name: name.to_owned(),
            personality,
            created_at: now,
            retired: false,
        };
        let id = agent.id;
        store
            .insert_agent(agent, AgentStatus::full(id, Position::new(0.0, 0.0), now))
            .unwrap();
        id
    }

    #[test]
    fn short_gaps_are_absorbed() {
        let store = Store::new();
        spawn(&store, "Ada", Personality::neutral());
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(1);
        let report = catch_up(
            &store,
            &OfflineSettings::default(),
            &mut rng,
            now - Duration::minutes(45),
            now,
        )
        .unwrap();
        assert!(report.is_none());
    }

    #[test]
    fn long_gaps_grow_needs_and_wear_vitals() {
        let store = Store::new();
        let id = spawn(&store, "Bo", Personality::neutral());
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(2);
        let report = catch_up(
            &store,
            &OfflineSettings::default(),
            &mut rng,
            now - Duration::hours(10),
            now,
        )
        .unwrap()
        .unwrap();
        assert_eq!(report.hours, 10);
        assert_eq!(report.agents_processed, 1);

        let emotions = store.latest_emotions(id, now).unwrap();
        // 0.5 + 10 * 0.05 = 1.0, clamped.
        assert_eq!(emotions.hunger, Decimal::ONE);
        // Curiosity decays to its 0.3 floor.
        assert_eq!(emotions.curiosity, Decimal::new(3, 1));
        // Stress decays to zero.
        assert_eq!(emotions.stress, Decimal::ZERO);

        let status = store.status(id).unwrap();
        // Health wear caps at 5 points; food drops one per hour.
        assert_eq!(status.health, Decimal::from(15_u32));
        assert_eq!(status.food, Decimal::from(10_u32));
    }

    #[test]
    fn vitals_never_fall_below_the_floor() {
        let store = Store::new();
        let id = spawn(&store, "Cy", Personality::neutral());
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(3);
        catch_up(
            &store,
            &OfflineSettings::default(),
            &mut rng,
            now - Duration::hours(72),
            now,
        )
        .unwrap()
        .unwrap();
        let status = store.status(id).unwrap();
        assert_eq!(status.health, Decimal::from(15_u32));
        assert_eq!(status.food, Decimal::from(5_u32));
    }

    #[test]
    fn gap_is_capped_by_settings() {
        let store = Store::new();
        spawn(&store, "Dot", Personality::neutral());
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(4);
        let settings = OfflineSettings {
            enabled: true,
            max_hours: 12,
        };
        let report = catch_up(&store, &settings, &mut rng, now - Duration::hours(100), now)
            .unwrap()
            .unwrap();
        assert_eq!(report.hours, 12);
    }

    #[test]
    fn a_longer_gap_never_does_less() {
        let near = Store::new();
        let far = Store::new();
        let a = spawn(&near, "Eli", Personality::neutral());
        let b = spawn(&far, "Eli", Personality::neutral());
        let now = Utc::now();

        let mut rng = StdRng::seed_from_u64(7);
        let short = catch_up(
            &near,
            &OfflineSettings::default(),
            &mut rng,
            now - Duration::hours(6),
            now,
        )
        .unwrap()
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let long = catch_up(
            &far,
            &OfflineSettings::default(),
            &mut rng,
            now - Duration::hours(12),
            now,
        )
        .unwrap()
        .unwrap();

        assert!(long.hours > short.hours);
        assert!(long.memories_written >= short.memories_written);

        let after_short = near.latest_emotions(a, now).unwrap();
        let after_long = far.latest_emotions(b, now).unwrap();
        assert!(after_long.hunger >= after_short.hunger);
        assert!(after_long.boredom >= after_short.boredom);
        assert!(after_long.loneliness >= after_short.loneliness);
        assert!(after_long.stress <= after_short.stress);

        let short_status = near.status(a).unwrap();
        let long_status = far.status(b).unwrap();
        assert!(long_status.food <= short_status.food);
        assert!(long_status.health <= short_status.health);
    }

    #[test]
    fn industrious_agents_synthesize_more_memories() {
        let store = Store::new();
        let n = Decimal::new(5, 1);
        let driven = spawn(
            &store,
            "Eve",
            Personality::new(n, n, n, n, n, n, n, Decimal::ONE),
        );
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(5);
        catch_up(
            &store,
            &OfflineSettings::default(),
            &mut rng,
            now - Duration::hours(10),
            now,
        )
        .unwrap()
        .unwrap();
        // 10 * (0.5 + 1.0 * 0.5) = 10 memories.
        assert_eq!(store.memory_count(driven, Some(MemoryKind::Event)).unwrap(), 10);
    }

    #[test]
    fn disabled_catch_up_is_a_no_op() {
        let store = Store::new();
        spawn(&store, "Fin", Personality::neutral());
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(6);
        let settings = OfflineSettings {
            enabled: false,
            max_hours: 72,
        };
        let report =
            catch_up(&store, &settings, &mut rng, now - Duration::hours(10), now).unwrap();
        assert!(report.is_none());
    }
}
