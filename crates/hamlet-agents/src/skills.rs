//! Skill levels derived from memory history.
//!
//! Skills are not stored anywhere: an agent's level in a domain is a pure
//! function of how many relevant memories it has accumulated. Practice
//! writes memories; the level follows. Levels never decay because the
//! memories backing them are never deleted.

use chrono::{DateTime, Utc};
use hamlet_store::Store;
use hamlet_types::{AgentId, Memory, MemoryKind, SkillCategory};
use rust_decimal::Decimal;

use crate::error::AgentError;

/// Baseline level everyone has in every skill (0.2).
fn base_level() -> Decimal {
    Decimal::new(2, 1)
}

/// Per-relevant-memory increment (0.02).
fn per_memory_gain() -> Decimal {
    Decimal::new(2, 2)
}

/// Maximum level gained through practice alone (0.6 above base).
fn practice_cap() -> Decimal {
    Decimal::new(6, 1)
}

/// Stable lowercase name for a skill domain, as used in memory payloads.
pub const fn skill_name(category: SkillCategory) -> &'static str {
    match category {
        SkillCategory::Mining => "mining",
        SkillCategory::Building => "building",
        SkillCategory::Farming => "farming",
        SkillCategory::Combat => "combat",
        SkillCategory::Trading => "trading",
        SkillCategory::Exploration => "exploration",
    }
}

/// Whether a memory counts as practice for a skill domain.
///
/// Skill memories tag their domain explicitly; trade and discovery
/// memories count toward trading and exploration on kind alone.
fn counts_toward(memory: &Memory, category: SkillCategory) -> bool {
    match memory.kind {
        MemoryKind::Skill => memory
            .content
            .get("skill")
            .and_then(serde_json::Value::as_str)
            .is_some_and(|s| s == skill_name(category)),
        MemoryKind::Trade => category == SkillCategory::Trading,
        MemoryKind::Discovery => category == SkillCategory::Exploration,
        _ => false,
    }
}

/// An agent's current level in one skill domain, in [0.2, 1.0].
///
/// Level is `0.2 + min(0.02 * relevant_memories, 0.6)`, clamped at 1.0.
///
/// # Errors
///
/// Returns [`AgentError::Store`] if memory history cannot be read.
pub fn skill_level(
    store: &Store,
    agent: AgentId,
    category: SkillCategory,
) -> Result<Decimal, AgentError> {
    let memories = store.recent_memories(agent, None, usize::MAX)?;
    let relevant = memories.iter().filter(|m| counts_toward(m, category)).count();
    let gained = per_memory_gain()
        .saturating_mul(Decimal::from(relevant))
        .min(practice_cap());
    Ok(base_level().saturating_add(gained).min(Decimal::ONE))
}

/// Build the memory recording one practice session in a skill domain.
pub fn practice_memory(
    agent: AgentId,
    category: SkillCategory,
    now: DateTime<Utc>,
) -> Memory {
    Memory::new(
        agent,
        MemoryKind::Skill,
        serde_json::json!({ "skill": skill_name(category) }),
        Decimal::new(4, 1),
        now,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hamlet_types::{Agent, AgentStatus, Personality, Position};

    use super::*;

    fn spawn(store: &Store) -> AgentId {
        let now = Utc::now();
        let agent = Agent {
            id: AgentId::new(),
            name: String::from("Sage"),
            personality: Personality::neutral(),
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
    fn fresh_agent_sits_at_baseline() {
        let store = Store::new();
        let id = spawn(&store);
        let level = skill_level(&store, id, SkillCategory::Mining).unwrap();
        assert_eq!(level, Decimal::new(2, 1));
    }

    #[test]
    fn practice_raises_the_level() {
        let store = Store::new();
        let id = spawn(&store);
        let now = Utc::now();
        for _ in 0..5 {
            store
                .append_memory(practice_memory(id, SkillCategory::Building, now))
                .unwrap();
        }
        let level = skill_level(&store, id, SkillCategory::Building).unwrap();
        assert_eq!(level, Decimal::new(3, 1)); // 0.2 + 5 * 0.02

        // Unrelated domains are untouched.
        let other = skill_level(&store, id, SkillCategory::Farming).unwrap();
        assert_eq!(other, Decimal::new(2, 1));
    }

    #[test]
    fn practice_gain_caps_at_point_eight() {
        let store = Store::new();
        let id = spawn(&store);
        let now = Utc::now();
        for _ in 0..50 {
            store
                .append_memory(practice_memory(id, SkillCategory::Combat, now))
                .unwrap();
        }
        let level = skill_level(&store, id, SkillCategory::Combat).unwrap();
        assert_eq!(level, Decimal::new(8, 1)); // 0.2 + capped 0.6
    }

    #[test]
    fn trade_memories_count_toward_trading() {
        let store = Store::new();
        let id = spawn(&store);
        let now = Utc::now();
        store
            .append_memory(Memory::new(
                id,
                MemoryKind::Trade,
                serde_json::json!({}),
                Decimal::new(6, 1),
                now,
            ))
            .unwrap();
        let level = skill_level(&store, id, SkillCategory::Trading).unwrap();
        assert_eq!(level, Decimal::new(22, 2));
    }
}
