//! The runtime loops.
//!
//! One scheduler drives four cadences from a single task: decision
//! cycles for every agent, ambient emotional drift, society passes
//! (village formation, elections, culture), and stale-trade sweeps.
//! A failed pass is logged and the loop keeps going; only shutdown
//! stops the scheduler.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hamlet_agents::{TradeEngine, emotion};
use hamlet_society::{CultureEngine, GovernanceEngine, VillageEngine};
use hamlet_store::Store;
use hamlet_types::{AgentId, VillageRole};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::config::SimConfig;
use crate::cycle::AgentCycle;
use crate::driver::WorldDriver;
use crate::error::CoreError;
use crate::registry::AgentRegistry;
use crate::relay::{LocalRelay, MessageRelay};

/// Owns the loop cadences and the per-agent cycle table.
pub struct Scheduler {
    store: Store,
    registry: AgentRegistry,
    relay: Arc<LocalRelay>,
    driver: Arc<dyn WorldDriver>,
    config: SimConfig,
}

impl Scheduler {
    /// Create a scheduler over the shared store and a world driver.
    pub fn new(store: Store, driver: Arc<dyn WorldDriver>, config: SimConfig) -> Self {
        let registry = AgentRegistry::new(store.clone());
        Self {
            store,
            registry,
            relay: Arc::new(LocalRelay::new()),
            driver,
            config,
        }
    }

    /// Run until the shutdown signal flips to `true`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] only if the initial roster read
    /// fails; per-pass failures are logged and absorbed.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), CoreError> {
        let mut rng = StdRng::seed_from_u64(self.config.world.seed);
        let mut cycles: HashMap<AgentId, AgentCycle> = HashMap::new();
        sync_cycles(&self.registry, &self.store, &self.relay, &mut cycles)?;

        let trade_engine = TradeEngine::new(self.store.clone());
        let village_engine = VillageEngine::new(self.store.clone());
        let culture_engine = CultureEngine::new(self.store.clone());
        let governance = GovernanceEngine::new(self.store.clone());

        let mut action_tick = interval(secs(self.config.cycles.action_interval_secs));
        let mut emotion_tick = interval(secs(self.config.cycles.emotion_interval_secs));
        let mut society_tick = interval(secs(self.config.cycles.society_interval_secs));
        let mut sweep_tick = interval(secs(self.config.cycles.trade_sweep_interval_secs));

        info!(
            action_interval_secs = self.config.cycles.action_interval_secs,
            emotion_interval_secs = self.config.cycles.emotion_interval_secs,
            society_interval_secs = self.config.cycles.society_interval_secs,
            "scheduler running"
        );

        loop {
            tokio::select! {
                _ = action_tick.tick() => {
                    if let Err(err) = self.action_pass(&mut cycles, &mut rng).await {
                        warn!(%err, "action pass failed");
                    }
                }
                _ = emotion_tick.tick() => {
                    if let Err(err) = self.emotion_pass() {
                        warn!(%err, "emotion pass failed");
                    }
                }
                _ = society_tick.tick() => {
                    if let Err(err) =
                        self.society_pass(&village_engine, &culture_engine, &governance, &mut rng)
                    {
                        warn!(%err, "society pass failed");
                    }
                }
                _ = sweep_tick.tick() => {
                    match trade_engine.sweep_stale(Utc::now()) {
                        Ok(0) => {}
                        Ok(swept) => debug!(swept, "stale trades dropped"),
                        Err(err) => warn!(%err, "trade sweep failed"),
                    }
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("scheduler stopping");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Run one decision cycle for every live agent.
    async fn action_pass(
        &self,
        cycles: &mut HashMap<AgentId, AgentCycle>,
        rng: &mut StdRng,
    ) -> Result<(), CoreError> {
        sync_cycles(&self.registry, &self.store, &self.relay, cycles)?;
        let timeout = Duration::from_millis(self.config.cycles.action_timeout_ms);
        let now = Utc::now();
        for cycle in cycles.values_mut() {
            if let Err(err) = cycle.run(self.driver.as_ref(), rng, timeout, now).await {
                warn!(agent_id = %cycle.agent_id(), %err, "cycle failed");
            }
        }
        Ok(())
    }

    /// Apply ambient emotional drift to every live agent.
    fn emotion_pass(&self) -> Result<(), CoreError> {
        let now = Utc::now();
        for agent in self.store.agents()? {
            let mut state = self.store.latest_emotions(agent.id, now)?;
            emotion::drift(&mut state, now);
            self.store.append_emotions(agent.id, state)?;
        }
        Ok(())
    }

    /// Villages form, leaders get elected, culture is reassessed.
    fn society_pass(
        &self,
        villages: &VillageEngine,
        culture: &CultureEngine,
        governance: &GovernanceEngine,
        rng: &mut StdRng,
    ) -> Result<(), CoreError> {
        let now = Utc::now();
        let report = villages.scan_and_form(rng, now)?;
        if !report.founded.is_empty() || !report.expanded.is_empty() {
            info!(
                founded = report.founded.len(),
                expanded = report.expanded.len(),
                "village scan produced changes"
            );
        }
        for village in self.store.villages()? {
            let members = self.store.members(village.id)?;
            if members.is_empty() {
                continue;
            }
            if !members.iter().any(|m| m.role == VillageRole::Leader) {
                governance.elect_leader(village.id, now)?;
            }
            culture.reassess(village.id, now)?;
        }
        Ok(())
    }
}

/// Bring the cycle table in line with the live roster: new agents get a
/// cycle and a relay mailbox, retired ones are dropped.
fn sync_cycles(
    registry: &AgentRegistry,
    store: &Store,
    relay: &Arc<LocalRelay>,
    cycles: &mut HashMap<AgentId, AgentCycle>,
) -> Result<(), CoreError> {
    let live = registry.live()?;
    cycles.retain(|id, _| live.contains(id));
    for id in live {
        cycles.entry(id).or_insert_with(|| {
            relay.register(id);
            AgentCycle::new(store.clone(), Arc::clone(relay) as Arc<dyn MessageRelay>, id)
        });
    }
    Ok(())
}

fn secs(value: u64) -> Duration {
    Duration::from_secs(value.max(1))
}
