//! Cultural evolution: traditions, dominant styles, and village history.
//!
//! Culture is read off the event log, never scripted. A behavior becomes
//! a tradition when it has recurred enough times at a steady rhythm; a
//! village's dominant style is whichever behavioral signal scores
//! highest from member personalities and logged activity.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use hamlet_store::Store;
use hamlet_types::{
    CultureStyle, EventId, EventKind, Memory, MemoryKind, Personality, StoredEvent, Tradition,
    TraditionKind, VillageId,
};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::SocietyError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Occurrences required before a behavior can be a tradition.
const MIN_REPETITIONS: usize = 5;

/// Timestamps required before rhythm can be judged at all.
const MIN_RHYTHM_SAMPLES: usize = 3;

/// Which logged behavior feeds which tradition.
const fn tradition_source(kind: EventKind) -> Option<TraditionKind> {
    match kind {
        EventKind::GoalProposed => Some(TraditionKind::DailyGathering),
        EventKind::TradeCompleted => Some(TraditionKind::TradeFair),
        EventKind::BuildCompleted => Some(TraditionKind::CollaborativeBuilding),
        EventKind::ResourceShared => Some(TraditionKind::ResourceSharing),
        EventKind::ExplorationCompleted => Some(TraditionKind::ExplorationExpedition),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Regularity
// ---------------------------------------------------------------------------

/// Whether a series of timestamps recurs at a steady rhythm.
///
/// Steady means the coefficient of variation of the inter-event gaps is
/// below 0.5, checked as `variance < 0.25 * mean^2` to avoid a square
/// root. Fewer than three timestamps, or a degenerate zero mean gap,
/// never qualify.
pub fn is_regular(timestamps: &[DateTime<Utc>]) -> bool {
    if timestamps.len() < MIN_RHYTHM_SAMPLES {
        return false;
    }
    let mut sorted = timestamps.to_vec();
    sorted.sort_unstable();
    let gaps: Vec<Decimal> = sorted
        .windows(2)
        .filter_map(|w| match (w.first(), w.get(1)) {
            (Some(a), Some(b)) => {
                Some(Decimal::from(b.signed_duration_since(*a).num_milliseconds()))
            }
            _ => None,
        })
        .collect();
    let count = Decimal::from(gaps.len());
    let mean = gaps
        .iter()
        .fold(Decimal::ZERO, |acc, g| acc.saturating_add(*g))
        .checked_div(count)
        .unwrap_or(Decimal::ZERO);
    if mean <= Decimal::ZERO {
        return false;
    }
    let variance = gaps
        .iter()
        .map(|g| {
            let deviation = g.saturating_sub(mean);
            deviation.saturating_mul(deviation)
        })
        .fold(Decimal::ZERO, |acc, d| acc.saturating_add(d))
        .checked_div(count)
        .unwrap_or(Decimal::ZERO);
    let bound = mean.saturating_mul(mean).saturating_mul(Decimal::new(25, 2));
    variance < bound
}

// ---------------------------------------------------------------------------
// Tradition detection
// ---------------------------------------------------------------------------

/// Detect recurring behavior patterns from a village's event history.
///
/// Every pattern with at least [`MIN_REPETITIONS`] occurrences is
/// reported; only the ones flagged `regular` count as established
/// traditions.
pub fn detect_traditions(events: &[StoredEvent]) -> Vec<Tradition> {
    let mut grouped: BTreeMap<TraditionKind, (Vec<DateTime<Utc>>, BTreeSet<_>)> = BTreeMap::new();
    for event in events {
        let Some(kind) = tradition_source(event.kind) else {
            continue;
        };
        let entry = grouped.entry(kind).or_default();
        entry.0.push(event.recorded_at);
        if let Some(agent) = event.agent_id {
            entry.1.insert(agent);
        }
    }
    grouped
        .into_iter()
        .filter(|(_, (timestamps, _))| timestamps.len() >= MIN_REPETITIONS)
        .map(|(kind, (timestamps, participants))| Tradition {
            kind,
            frequency: u32::try_from(timestamps.len()).unwrap_or(u32::MAX),
            regular: is_regular(&timestamps),
            participants: u32::try_from(participants.len()).unwrap_or(u32::MAX),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dominant style
// ---------------------------------------------------------------------------

/// Activity counts pulled from a village's event history.
#[derive(Debug, Clone, Copy, Default)]
struct ActivityCounts {
    builds: u32,
    explorations: u32,
    trades: u32,
    combats: u32,
    farms: u32,
}

fn count_activity(events: &[StoredEvent]) -> ActivityCounts {
    let mut counts = ActivityCounts::default();
    for event in events {
        match event.kind {
            EventKind::BuildCompleted => counts.builds = counts.builds.saturating_add(1),
            EventKind::ExplorationCompleted => {
                counts.explorations = counts.explorations.saturating_add(1);
            }
            EventKind::TradeCompleted => counts.trades = counts.trades.saturating_add(1),
            EventKind::CombatFought => counts.combats = counts.combats.saturating_add(1),
            EventKind::FarmWorked => counts.farms = counts.farms.saturating_add(1),
            _ => {}
        }
    }
    counts
}

fn trait_mean<F: Fn(&Personality) -> Decimal>(personalities: &[Personality], f: F) -> Decimal {
    if personalities.is_empty() {
        return Decimal::ZERO;
    }
    let total = personalities
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc.saturating_add(f(p)));
    total
        .checked_div(Decimal::from(personalities.len()))
        .unwrap_or(Decimal::ZERO)
}

fn activity_weight(count: u32, per: Decimal) -> Decimal {
    Decimal::from(count).saturating_mul(per)
}

/// The dominant style of a village from member personalities and logged
/// activity.
///
/// Starts at peaceful with a zero score; each candidate must strictly
/// beat the running best, so the fixed evaluation order decides ties.
pub fn dominant_style(personalities: &[Personality], events: &[StoredEvent]) -> CultureStyle {
    if personalities.is_empty() {
        return CultureStyle::Peaceful;
    }
    let counts = count_activity(events);
    let candidates = [
        (
            CultureStyle::Builder,
            trait_mean(personalities, |p| p.work_ethic)
                .saturating_mul(Decimal::TWO)
                .saturating_add(activity_weight(counts.builds, Decimal::new(1, 1))),
        ),
        (
            CultureStyle::Explorer,
            trait_mean(personalities, |p| p.curiosity)
                .saturating_mul(Decimal::TWO)
                .saturating_add(activity_weight(counts.explorations, Decimal::new(1, 1))),
        ),
        (
            CultureStyle::Trader,
            trait_mean(personalities, |p| p.ambition)
                .saturating_mul(Decimal::new(15, 1))
                .saturating_add(
                    trait_mean(personalities, |p| p.sociability)
                        .saturating_mul(Decimal::new(5, 1)),
                )
                .saturating_add(activity_weight(counts.trades, Decimal::new(1, 1))),
        ),
        (
            CultureStyle::Warrior,
            trait_mean(personalities, |p| p.aggression)
                .saturating_mul(Decimal::TWO)
                .saturating_add(activity_weight(counts.combats, Decimal::new(1, 1))),
        ),
        (
            CultureStyle::Agricultural,
            trait_mean(personalities, |p| p.work_ethic)
                .saturating_mul(Decimal::new(12, 1))
                .saturating_add(activity_weight(counts.farms, Decimal::new(15, 2))),
        ),
    ];

    let mut best = CultureStyle::Peaceful;
    let mut best_score = Decimal::ZERO;
    for (style, score) in candidates {
        if score > best_score {
            best = style;
            best_score = score;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Historical importance
// ---------------------------------------------------------------------------

/// How important a historical moment is to remember.
///
/// Fixed base per event kind plus a small bonus for how many agents took
/// part, capped at 1.0.
pub fn historical_importance(kind: EventKind, participants: u32) -> Decimal {
    let base = match kind {
        EventKind::VillageFounded => Decimal::ONE,
        EventKind::CulturalShift => Decimal::new(9, 1), // 0.90
        EventKind::LeaderElected => Decimal::new(85, 2),
        EventKind::BuildCompleted => Decimal::new(8, 1),
        EventKind::TradeCompleted => Decimal::new(75, 2),
        EventKind::AllianceFormed => Decimal::new(8, 1),
        _ => Decimal::new(5, 1),
    };
    let bonus = Decimal::from(participants)
        .saturating_mul(Decimal::new(5, 2))
        .min(Decimal::new(3, 1));
    base.saturating_add(bonus).min(Decimal::ONE)
}

// ---------------------------------------------------------------------------
// CultureEngine
// ---------------------------------------------------------------------------

/// Outcome of one culture reassessment.
#[derive(Debug, Clone)]
pub struct CultureReport {
    /// Patterns meeting the repetition bar, regular or not.
    pub traditions: Vec<Tradition>,
    /// The style the village settled on this pass.
    pub style: CultureStyle,
    /// Whether the style changed from the stored one.
    pub shifted: bool,
}

/// Store-backed cultural reassessment.
#[derive(Debug, Clone)]
pub struct CultureEngine {
    store: Store,
}

impl CultureEngine {
    /// Create an engine over the shared store.
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Reassess one village's traditions and dominant style.
    ///
    /// Newly established (regular) traditions are logged once; a style
    /// change updates the village record, logs a cultural shift, and
    /// leaves each member a historical memory of it.
    ///
    /// # Errors
    ///
    /// Returns [`SocietyError::Store`] on store failures.
    pub fn reassess(
        &self,
        village_id: VillageId,
        now: DateTime<Utc>,
    ) -> Result<CultureReport, SocietyError> {
        let village = self.store.village(village_id)?;
        let events = self.store.village_events(village_id)?;
        let members = self.store.members(village_id)?;
        let mut personalities = Vec::new();
        for member in &members {
            personalities.push(self.store.agent(member.agent_id)?.personality);
        }

        let traditions = detect_traditions(&events);
        let already_logged: BTreeSet<TraditionKind> = events
            .iter()
            .filter(|e| e.kind == EventKind::TraditionEstablished)
            .filter_map(|e| e.metadata.get("tradition").cloned())
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect();
        for tradition in traditions.iter().filter(|t| t.regular) {
            if already_logged.contains(&tradition.kind) {
                continue;
            }
            info!(village_id = %village_id, tradition = ?tradition.kind, "tradition established");
            self.store.append_event(StoredEvent {
                id: EventId::new(),
                kind: EventKind::TraditionEstablished,
                description: String::from("a recurring behavior became a tradition"),
                agent_id: None,
                village_id: Some(village_id),
                metadata: serde_json::json!({
                    "tradition": tradition.kind,
                    "frequency": tradition.frequency,
                    "participants": tradition.participants,
                }),
                recorded_at: now,
            })?;
        }

        let style = dominant_style(&personalities, &events);
        let shifted = style != village.culture;
        if shifted {
            self.store.set_culture(village_id, style)?;
            info!(village_id = %village_id, from = ?village.culture, to = ?style, "cultural shift");
            self.store.append_event(StoredEvent {
                id: EventId::new(),
                kind: EventKind::CulturalShift,
                description: String::from("the village's dominant culture changed"),
                agent_id: None,
                village_id: Some(village_id),
                metadata: serde_json::json!({ "from": village.culture, "to": style }),
                recorded_at: now,
            })?;
            let participants = u32::try_from(members.len()).unwrap_or(u32::MAX);
            let importance = historical_importance(EventKind::CulturalShift, participants);
            for member in &members {
                self.store.append_memory(Memory::new(
                    member.agent_id,
                    MemoryKind::Historical,
                    serde_json::json!({ "village": village_id, "culture": style }),
                    importance,
                    now,
                ))?;
            }
        }

        Ok(CultureReport {
            traditions,
            style,
            shifted,
        })
    }

    /// Cultural compatibility between two villages, in [0, 1].
    ///
    /// Blends how much their established traditions overlap (Jaccard,
    /// weight 0.4) with whether their styles match (1.0 or 0.3, weight
    /// 0.6).
    ///
    /// # Errors
    ///
    /// Returns [`SocietyError::Store`] on store failures.
    pub fn compatibility(&self, a: VillageId, b: VillageId) -> Result<Decimal, SocietyError> {
        let style_a = self.store.village(a)?.culture;
        let style_b = self.store.village(b)?.culture;
        let traditions_a = established_kinds(&self.store.village_events(a)?);
        let traditions_b = established_kinds(&self.store.village_events(b)?);

        let union = traditions_a.union(&traditions_b).count();
        let overlap = if union == 0 {
            Decimal::ZERO
        } else {
            let shared = traditions_a.intersection(&traditions_b).count();
            Decimal::from(shared)
                .checked_div(Decimal::from(union))
                .unwrap_or(Decimal::ZERO)
        };
        let style_match = if style_a == style_b {
            Decimal::ONE
        } else {
            Decimal::new(3, 1)
        };
        Ok(overlap
            .saturating_mul(Decimal::new(4, 1))
            .saturating_add(style_match.saturating_mul(Decimal::new(6, 1))))
    }
}

fn established_kinds(events: &[StoredEvent]) -> BTreeSet<TraditionKind> {
    detect_traditions(events)
        .into_iter()
        .filter(|t| t.regular)
        .map(|t| t.kind)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Duration;
    use hamlet_types::{Agent, AgentId, AgentStatus, Position, Village};

    use super::*;

    fn stamped(kind: EventKind, at: DateTime<Utc>) -> StoredEvent {
        StoredEvent {
            id: EventId::new(),
            kind,
            description: String::new(),
            agent_id: None,
            village_id: None,
            metadata: serde_json::json!({}),
            recorded_at: at,
        }
    }

    fn evenly_spaced(kind: EventKind, n: i64, start: DateTime<Utc>) -> Vec<StoredEvent> {
        (0..n)
            .map(|i| stamped(kind, start + Duration::hours(i)))
            .collect()
    }

    #[test]
    fn five_even_occurrences_make_a_regular_tradition() {
        let start = Utc::now();
        let events = evenly_spaced(EventKind::TradeCompleted, 5, start);
        let traditions = detect_traditions(&events);
        assert_eq!(traditions.len(), 1);
        let t = traditions.first().unwrap();
        assert_eq!(t.kind, TraditionKind::TradeFair);
        assert_eq!(t.frequency, 5);
        assert!(t.regular);
    }

    #[test]
    fn four_occurrences_are_not_enough() {
        let events = evenly_spaced(EventKind::TradeCompleted, 4, Utc::now());
        assert!(detect_traditions(&events).is_empty());
    }

    #[test]
    fn erratic_spacing_is_frequent_but_irregular() {
        let start = Utc::now();
        let offsets = [0_i64, 1, 2, 50, 51];
        let events: Vec<StoredEvent> = offsets
            .iter()
            .map(|&h| stamped(EventKind::BuildCompleted, start + Duration::hours(h)))
            .collect();
        let traditions = detect_traditions(&events);
        assert_eq!(traditions.len(), 1);
        assert!(!traditions.first().unwrap().regular);
    }

    #[test]
    fn rhythm_needs_three_samples() {
        let start = Utc::now();
        assert!(!is_regular(&[start, start + Duration::hours(1)]));
        assert!(is_regular(&[
            start,
            start + Duration::hours(1),
            start + Duration::hours(2),
        ]));
    }

    #[test]
    fn industrious_villages_build() {
        let hardworking = Personality::new(
            Decimal::new(3, 1),
            Decimal::new(3, 1),
            Decimal::new(3, 1),
            Decimal::new(1, 1),
            Decimal::new(5, 1),
            Decimal::new(5, 1),
            Decimal::new(3, 1),
            Decimal::ONE, // work_ethic
        );
        let style = dominant_style(&[hardworking.clone(), hardworking], &[]);
        assert_eq!(style, CultureStyle::Builder);
    }

    #[test]
    fn activity_can_outweigh_temperament() {
        let neutral = Personality::neutral();
        // Neutral traits tie builder/explorer/warrior at 1.0 and trader at
        // 1.0; twenty trades break the tie decisively.
        let events = evenly_spaced(EventKind::TradeCompleted, 20, Utc::now());
        let style = dominant_style(&[neutral], &events);
        assert_eq!(style, CultureStyle::Trader);
    }

    #[test]
    fn empty_village_is_peaceful() {
        assert_eq!(dominant_style(&[], &[]), CultureStyle::Peaceful);
    }

    #[test]
    fn founding_importance_caps_at_one() {
        assert_eq!(
            historical_importance(EventKind::VillageFounded, 12),
            Decimal::ONE
        );
        assert_eq!(
            historical_importance(EventKind::LeaderElected, 2),
            Decimal::new(95, 2)
        );
    }

    #[test]
    fn exact_ties_go_to_the_first_candidate() {
        // Neutral traits with no activity score builder, explorer, trader,
        // and warrior all at exactly 1.0; the fixed evaluation order picks
        // builder.
        let style = dominant_style(&[Personality::neutral()], &[]);
        assert_eq!(style, CultureStyle::Builder);
    }

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

    fn found(store: &Store, name: &str, members: &[AgentId]) -> VillageId {
        let now = Utc::now();
        store
            .create_village(
                Village {
                    id: VillageId::new(),
                    name: name.to_owned(),
                    center: Position::new(0.0, 0.0),
                    radius: 50.0,
                    population: 0,
                    culture: CultureStyle::Emerging,
                    founded_at: now,
                },
                members,
                now,
            )
            .unwrap()
            .id
    }

    #[test]
    fn reassess_logs_a_shift_only_when_the_style_moves() {
        let store = Store::new();
        let hardworking = Personality::new(
            Decimal::new(3, 1),
            Decimal::new(3, 1),
            Decimal::new(3, 1),
            Decimal::new(1, 1),
            Decimal::new(5, 1),
            Decimal::new(5, 1),
            Decimal::new(3, 1),
            Decimal::ONE,
        );
        let a = spawn(&store, "Ada", hardworking.clone());
        let b = spawn(&store, "Bo", hardworking);
        let village_id = found(&store, "Oakrest", &[a, b]);
        let engine = CultureEngine::new(store.clone());
        let now = Utc::now();

        let first = engine.reassess(village_id, now).unwrap();
        assert!(first.shifted);
        assert_eq!(first.style, CultureStyle::Builder);
        assert_eq!(store.village(village_id).unwrap().culture, CultureStyle::Builder);
        let shifts = store
            .recent_events(Some(EventKind::CulturalShift), Some(village_id), 10)
            .unwrap();
        assert_eq!(shifts.len(), 1);
        let recalled = store
            .recent_memories(a, Some(MemoryKind::Historical), 10)
            .unwrap();
        assert_eq!(recalled.len(), 1);

        let second = engine.reassess(village_id, now).unwrap();
        assert!(!second.shifted);
        let shifts = store
            .recent_events(Some(EventKind::CulturalShift), Some(village_id), 10)
            .unwrap();
        assert_eq!(shifts.len(), 1);
    }

    #[test]
    fn compatibility_blends_traditions_and_style() {
        let store = Store::new();
        let a = spawn(&store, "Cy", Personality::neutral());
        let b = spawn(&store, "Di", Personality::neutral());
        let left = found(&store, "Oakrest", &[a]);
        let right = found(&store, "Birchdown", &[b]);
        let engine = CultureEngine::new(store.clone());

        // Same style, no traditions anywhere: style weight only.
        assert_eq!(
            engine.compatibility(left, right).unwrap(),
            Decimal::new(6, 1)
        );

        // Both villages hold the same regular trade tradition.
        let start = Utc::now();
        for village_id in [left, right] {
            for event in evenly_spaced(EventKind::TradeCompleted, 5, start) {
                store
                    .append_event(StoredEvent {
                        village_id: Some(village_id),
                        ..event
                    })
                    .unwrap();
            }
        }
        assert_eq!(engine.compatibility(left, right).unwrap(), Decimal::ONE);
    }
}
