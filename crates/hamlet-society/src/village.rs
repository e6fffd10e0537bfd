//! Emergent village formation.
//!
//! Villages are never commanded into existence: a periodic scan walks the
//! relationship graph, finds clusters of mutually trusting agents, and
//! founds (or expands) settlements where the bonds are strong enough.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::{DateTime, Utc};
use hamlet_store::Store;
use hamlet_types::{
    AgentId, CultureStyle, EventId, EventKind, Memory, MemoryKind, Position, Relationship,
    StoredEvent, Village, VillageId,
};
use rand::Rng;
use rust_decimal::Decimal;
use tracing::info;

use crate::culture;
use crate::error::SocietyError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Average intra-cluster trust required to found a village (0.6).
fn formation_trust() -> Decimal {
    Decimal::new(6, 1)
}

/// Edge trust that must be exceeded to connect two agents in the
/// cluster walk (0.48).
///
/// Slightly looser than the formation average so a strong core can pull
/// in agents whose individual bonds are still maturing.
fn cluster_edge_trust() -> Decimal {
    formation_trust().saturating_mul(Decimal::new(8, 1))
}

/// Maximum distance between two agents for their bond to count in the
/// cluster walk.
const PROXIMITY_RADIUS: f64 = 50.0;

/// Minimum cluster size that can found a village.
const MIN_FOUNDERS: usize = 2;

/// Territory radius of a new village.
const TERRITORY_RADIUS: f64 = 50.0;

/// Name fragments for generated settlements.
const NAME_PREFIXES: [&str; 10] = [
    "Oak", "Elm", "Ash", "Stone", "River", "Fox", "Hill", "Wolf", "Bright", "Green",
];
const NAME_SUFFIXES: [&str; 8] = [
    "rest", "ford", "dale", "holm", "stead", "haven", "field", "brook",
];

// ---------------------------------------------------------------------------
// Pure clustering
// ---------------------------------------------------------------------------

/// Single-link clusters over relationship edges.
///
/// An edge connects two agents only when its trust exceeds the cluster
/// gate and the pair stand within [`PROXIMITY_RADIUS`] of each other;
/// a strong bond between agents on opposite ends of the map is not a
/// settlement. Agents are walked in sorted order and each lands in
/// exactly one cluster; isolated agents produce singleton clusters
/// that callers discard against [`MIN_FOUNDERS`].
pub fn trust_clusters(
    agents: &[AgentId],
    edges: &[Relationship],
    positions: &BTreeMap<AgentId, Position>,
) -> Vec<Vec<AgentId>> {
    let gate = cluster_edge_trust();
    let mut adjacency: BTreeMap<AgentId, Vec<AgentId>> = BTreeMap::new();
    let known: BTreeSet<AgentId> = agents.iter().copied().collect();
    for edge in edges {
        if edge.trust <= gate {
            continue;
        }
        let (a, b) = (edge.pair.first, edge.pair.second);
        if !known.contains(&a) || !known.contains(&b) {
            continue;
        }
        let (Some(at), Some(bt)) = (positions.get(&a), positions.get(&b)) else {
            continue;
        };
        if at.distance_to(*bt) > PROXIMITY_RADIUS {
            continue;
        }
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }

    let mut sorted: Vec<AgentId> = agents.to_vec();
    sorted.sort_unstable();
    let mut processed: BTreeSet<AgentId> = BTreeSet::new();
    let mut clusters = Vec::new();
    for &start in &sorted {
        if processed.contains(&start) {
            continue;
        }
        let mut cluster = Vec::new();
        let mut queue = VecDeque::from([start]);
        processed.insert(start);
        while let Some(current) = queue.pop_front() {
            cluster.push(current);
            if let Some(neighbors) = adjacency.get(&current) {
                for &next in neighbors {
                    if processed.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        cluster.sort_unstable();
        clusters.push(cluster);
    }
    clusters
}

/// Mean trust across all stored edges between cluster members.
///
/// Returns zero for a cluster with no internal edges.
pub fn average_trust(cluster: &[AgentId], edges: &[Relationship]) -> Decimal {
    let members: BTreeSet<AgentId> = cluster.iter().copied().collect();
    let mut total = Decimal::ZERO;
    let mut count = 0_u32;
    for edge in edges {
        if members.contains(&edge.pair.first) && members.contains(&edge.pair.second) {
            total = total.saturating_add(edge.trust);
            count = count.saturating_add(1);
        }
    }
    if count == 0 {
        return Decimal::ZERO;
    }
    total.checked_div(Decimal::from(count)).unwrap_or(Decimal::ZERO)
}

fn centroid(positions: &[Position]) -> Position {
    if positions.is_empty() {
        return Position::new(0.0, 0.0);
    }
    let count = f64::from(u32::try_from(positions.len()).unwrap_or(u32::MAX));
    let (sx, sz) = positions
        .iter()
        .fold((0.0_f64, 0.0_f64), |(x, z), p| (x + p.x, z + p.z));
    Position::new(sx / count, sz / count)
}

// ---------------------------------------------------------------------------
// VillageEngine
// ---------------------------------------------------------------------------

/// Outcome of one formation scan.
#[derive(Debug, Clone, Default)]
pub struct FormationReport {
    /// Villages founded this scan.
    pub founded: Vec<Village>,
    /// Villages that absorbed new members this scan.
    pub expanded: Vec<VillageId>,
}

/// Store-backed village lifecycle management.
#[derive(Debug, Clone)]
pub struct VillageEngine {
    store: Store,
}

impl VillageEngine {
    /// Create an engine over the shared store.
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Walk the relationship graph and found or expand villages.
    ///
    /// Only bonds between agents within [`PROXIMITY_RADIUS`] of each
    /// other enter the cluster walk. A qualifying cluster needs at least
    /// [`MIN_FOUNDERS`] members and an average internal trust of at
    /// least 0.6. If any cluster member already belongs to a village,
    /// the remaining members join that village instead of founding a
    /// rival next door.
    ///
    /// # Errors
    ///
    /// Returns [`SocietyError::Store`] on store failures.
    pub fn scan_and_form<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<FormationReport, SocietyError> {
        let agents: Vec<AgentId> = self.store.agents()?.into_iter().map(|a| a.id).collect();
        let edges = self.store.all_relationships()?;
        let mut positions: BTreeMap<AgentId, Position> = BTreeMap::new();
        for &agent in &agents {
            positions.insert(agent, self.store.status(agent)?.position);
        }
        let mut report = FormationReport::default();

        for cluster in trust_clusters(&agents, &edges, &positions) {
            if cluster.len() < MIN_FOUNDERS {
                continue;
            }
            if average_trust(&cluster, &edges) < formation_trust() {
                continue;
            }
            let housed = self.first_housed_village(&cluster)?;
            if let Some(village_id) = housed {
                if self.expand(village_id, &cluster, now)? {
                    report.expanded.push(village_id);
                }
            } else {
                report.founded.push(self.found(&cluster, rng, now)?);
            }
        }
        Ok(report)
    }

    /// Remove an agent from its village, recording abandonment when the
    /// last member leaves.
    ///
    /// # Errors
    ///
    /// Returns [`SocietyError::Store`] on store failures.
    pub fn leave(&self, agent: AgentId, now: DateTime<Utc>) -> Result<(), SocietyError> {
        let membership = self.store.member_of(agent)?;
        let Some(membership) = membership else {
            return Ok(());
        };
        if self.store.remove_member(agent)? == Some(0) {
            info!(village_id = %membership.village_id, "village abandoned");
            self.store.append_event(StoredEvent {
                id: EventId::new(),
                kind: EventKind::VillageAbandoned,
                description: String::from("the last member moved away"),
                agent_id: Some(agent),
                village_id: Some(membership.village_id),
                metadata: serde_json::json!({}),
                recorded_at: now,
            })?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn first_housed_village(&self, cluster: &[AgentId]) -> Result<Option<VillageId>, SocietyError> {
        for &agent in cluster {
            if let Some(member) = self.store.member_of(agent)? {
                return Ok(Some(member.village_id));
            }
        }
        Ok(None)
    }

    fn expand(
        &self,
        village_id: VillageId,
        cluster: &[AgentId],
        now: DateTime<Utc>,
    ) -> Result<bool, SocietyError> {
        let mut joined = Vec::new();
        for &agent in cluster {
            if self.store.member_of(agent)?.is_none() {
                self.store.add_member(village_id, agent, now)?;
                joined.push(agent);
            }
        }
        if joined.is_empty() {
            return Ok(false);
        }
        self.store.append_event(StoredEvent {
            id: EventId::new(),
            kind: EventKind::VillageExpanded,
            description: format!("{} agents joined the village", joined.len()),
            agent_id: None,
            village_id: Some(village_id),
            metadata: serde_json::json!({ "joined": joined }),
            recorded_at: now,
        })?;
        Ok(true)
    }

    fn found<R: Rng + ?Sized>(
        &self,
        cluster: &[AgentId],
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Village, SocietyError> {
        let mut positions = Vec::new();
        for &agent in cluster {
            positions.push(self.store.status(agent)?.position);
        }
        let name = generate_name(rng);
        let village = self.store.create_village(
            Village {
                id: VillageId::new(),
                name: name.clone(),
                center: centroid(&positions),
                radius: TERRITORY_RADIUS,
                population: 0,
                culture: CultureStyle::Emerging,
                founded_at: now,
            },
            cluster,
            now,
        )?;
        info!(village_id = %village.id, name = %village.name, founders = cluster.len(), "village founded");

        self.store.append_event(StoredEvent {
            id: EventId::new(),
            kind: EventKind::VillageFounded,
            description: format!("{name} was founded"),
            agent_id: None,
            village_id: Some(village.id),
            metadata: serde_json::json!({ "founders": cluster }),
            recorded_at: now,
        })?;
        let participants = u32::try_from(cluster.len()).unwrap_or(u32::MAX);
        let importance = culture::historical_importance(EventKind::VillageFounded, participants);
        for &agent in cluster {
            self.store.append_memory(Memory::new(
                agent,
                MemoryKind::Historical,
                serde_json::json!({ "village": village.id, "name": name }),
                importance,
                now,
            ))?;
        }
        Ok(village)
    }
}

fn generate_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let prefix = NAME_PREFIXES
        .get(rng.random_range(0..NAME_PREFIXES.len()))
        .copied()
        .unwrap_or("Oak");
    let suffix = NAME_SUFFIXES
        .get(rng.random_range(0..NAME_SUFFIXES.len()))
        .copied()
        .unwrap_or("rest");
    format!("{prefix}{suffix}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hamlet_types::{Agent, AgentStatus, PairKey, Personality};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn spawn(store: &Store, name: &str, position: Position) -> AgentId {
        let now = Utc::now();
        let agent = Agent {
            id: AgentId::new(),
            name: name.to_owned(),
            personality: Personality::neutral(),
            created_at: now,
            retired: false,
        };
        let id = agent.id;
        store
            .insert_agent(agent, AgentStatus::full(id, position, now))
            .unwrap();
        id
    }

    fn bond(store: &Store, a: AgentId, b: AgentId, trust: Decimal) {
        // One delta reaches the target trust; affinity tracks loosely.
        store
            .apply_relationship_delta(a, b, trust, trust, Utc::now())
            .unwrap();
    }

    fn positions_of(store: &Store, agents: &[AgentId]) -> BTreeMap<AgentId, Position> {
        agents
            .iter()
            .map(|&id| (id, store.status(id).unwrap().position))
            .collect()
    }

    #[test]
    fn high_trust_cluster_founds_a_village() {
        let store = Store::new();
        let a = spawn(&store, "Ada", Position::new(0.0, 0.0));
        let b = spawn(&store, "Bo", Position::new(10.0, 0.0));
        let c = spawn(&store, "Cy", Position::new(0.0, 10.0));
        bond(&store, a, b, Decimal::new(65, 2));
        bond(&store, b, c, Decimal::new(7, 1));

        let engine = VillageEngine::new(store.clone());
        let mut rng = StdRng::seed_from_u64(11);
        let report = engine.scan_and_form(&mut rng, Utc::now()).unwrap();
        assert_eq!(report.founded.len(), 1);

        let village = report.founded.first().unwrap();
        assert_eq!(village.population, 3);
        assert_eq!(village.culture, CultureStyle::Emerging);
        assert!((village.center.x - (10.0 / 3.0)).abs() < 1e-9);
        assert_eq!(store.members(village.id).unwrap().len(), 3);
        assert!(
            !store
                .recent_events(Some(EventKind::VillageFounded), Some(village.id), 5)
                .unwrap()
                .is_empty()
        );
        // Founders carry a historical memory of the founding.
        assert_eq!(store.memory_count(a, Some(MemoryKind::Historical)).unwrap(), 1);
    }

    #[test]
    fn low_trust_cluster_does_not_form() {
        let store = Store::new();
        let a = spawn(&store, "Dot", Position::new(0.0, 0.0));
        let b = spawn(&store, "Eve", Position::new(5.0, 0.0));
        bond(&store, a, b, Decimal::new(4, 1));

        let engine = VillageEngine::new(store.clone());
        let mut rng = StdRng::seed_from_u64(12);
        let report = engine.scan_and_form(&mut rng, Utc::now()).unwrap();
        assert!(report.founded.is_empty());
        assert!(store.villages().unwrap().is_empty());
    }

    #[test]
    fn borderline_edges_count_but_average_gates() {
        let store = Store::new();
        let a = spawn(&store, "Fin", Position::new(0.0, 0.0));
        let b = spawn(&store, "Gus", Position::new(5.0, 0.0));
        // Edge passes the 0.48 walk gate but the 0.6 average does not.
        bond(&store, a, b, Decimal::new(5, 1));

        let engine = VillageEngine::new(store.clone());
        let mut rng = StdRng::seed_from_u64(13);
        let report = engine.scan_and_form(&mut rng, Utc::now()).unwrap();
        assert!(report.founded.is_empty());

        let clusters = trust_clusters(
            &[a, b],
            &store.all_relationships().unwrap(),
            &positions_of(&store, &[a, b]),
        );
        assert!(clusters.iter().any(|c| c.len() == 2));
    }

    #[test]
    fn an_edge_at_the_walk_gate_does_not_connect() {
        let store = Store::new();
        let a = spawn(&store, "Mab", Position::new(0.0, 0.0));
        let b = spawn(&store, "Ned", Position::new(5.0, 0.0));
        // The gate must be exceeded; exactly 0.48 leaves both isolated.
        bond(&store, a, b, Decimal::new(48, 2));

        let clusters = trust_clusters(
            &[a, b],
            &store.all_relationships().unwrap(),
            &positions_of(&store, &[a, b]),
        );
        assert!(clusters.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn distant_agents_never_settle_together() {
        let store = Store::new();
        let a = spawn(&store, "Oda", Position::new(0.0, 0.0));
        let b = spawn(&store, "Pim", Position::new(100_000.0, 100_000.0));
        bond(&store, a, b, Decimal::new(7, 1));

        let engine = VillageEngine::new(store.clone());
        let mut rng = StdRng::seed_from_u64(16);
        let report = engine.scan_and_form(&mut rng, Utc::now()).unwrap();
        assert!(report.founded.is_empty());
        assert!(store.villages().unwrap().is_empty());

        let clusters = trust_clusters(
            &[a, b],
            &store.all_relationships().unwrap(),
            &positions_of(&store, &[a, b]),
        );
        assert!(clusters.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn cluster_touching_a_village_expands_it() {
        let store = Store::new();
        let a = spawn(&store, "Hol", Position::new(0.0, 0.0));
        let b = spawn(&store, "Ivy", Position::new(5.0, 0.0));
        bond(&store, a, b, Decimal::new(7, 1));

        let engine = VillageEngine::new(store.clone());
        let mut rng = StdRng::seed_from_u64(14);
        let report = engine.scan_and_form(&mut rng, Utc::now()).unwrap();
        let village_id = report.founded.first().unwrap().id;

        // A newcomer bonds with an existing member.
        let c = spawn(&store, "Jud", Position::new(2.0, 2.0));
        bond(&store, b, c, Decimal::new(8, 1));
        let report = engine.scan_and_form(&mut rng, Utc::now()).unwrap();
        assert!(report.founded.is_empty());
        assert_eq!(report.expanded, vec![village_id]);
        assert_eq!(store.village(village_id).unwrap().population, 3);
    }

    #[test]
    fn last_leaver_abandons_the_village() {
        let store = Store::new();
        let a = spawn(&store, "Kit", Position::new(0.0, 0.0));
        let b = spawn(&store, "Lea", Position::new(5.0, 0.0));
        bond(&store, a, b, Decimal::new(7, 1));

        let engine = VillageEngine::new(store.clone());
        let mut rng = StdRng::seed_from_u64(15);
        let village_id = engine
            .scan_and_form(&mut rng, Utc::now())
            .unwrap()
            .founded
            .first()
            .unwrap()
            .id;

        engine.leave(a, Utc::now()).unwrap();
        assert!(
            store
                .recent_events(Some(EventKind::VillageAbandoned), Some(village_id), 5)
                .unwrap()
                .is_empty()
        );
        engine.leave(b, Utc::now()).unwrap();
        assert!(
            !store
                .recent_events(Some(EventKind::VillageAbandoned), Some(village_id), 5)
                .unwrap()
                .is_empty()
        );
    }
}
