//! The per-agent decision cycle.
//!
//! Each cycle is observe -> decide -> act -> feel: the driver supplies a
//! [`WorldContext`], the decision engine picks an action, the executor
//! runs it through the driver under a timeout (social and trading
//! actions additionally go through their engines), and the emotional
//! consequences are written back. Before acting the agent reads its
//! relay mailbox and answers what arrived: trade offers are judged on
//! the spot, help and alliance requests get a social response. A small
//! phase machine guards against overlapping cycles; a tick that lands
//! while an agent is busy is a no-op.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hamlet_agents::decision::ActionChoice;
use hamlet_agents::{
    AgentAction, AgentError, SocialEngine, TradeDecision, TradeEngine, choose_action, emotion,
    skills,
};
use hamlet_store::Store;
use hamlet_types::{
    ActionCategory, AgentId, InteractionKind, InteractionOutcome, ItemStack, MessageEnvelope,
    MessageId, RelayMessage, SkillCategory, TradeId, WorldContext,
};
use rand::Rng;
use tracing::{debug, warn};

use crate::driver::WorldDriver;
use crate::error::CoreError;
use crate::executor;
use crate::relay::MessageRelay;

/// Where an agent is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// Ready to act on the next tick.
    Idle,
    /// A cycle is in flight.
    Acting,
    /// The last cycle just finished; one tick of rest before the next.
    CoolingDown,
}

/// What a tick did for one agent.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The agent was busy or cooling down; nothing happened.
    Skipped,
    /// A full cycle ran.
    Acted {
        /// The chosen action and its utility.
        choice: ActionChoice,
        /// Whether the world reported success.
        success: bool,
    },
}

/// Which skill a successful action practices, if any.
///
/// Social and trading skills accrue through their own engines; only
/// hands-on work is practiced here.
const fn practice_target(action: AgentAction) -> Option<SkillCategory> {
    match action {
        AgentAction::MineOre | AgentAction::GatherStone => Some(SkillCategory::Mining),
        AgentAction::GatherFood => Some(SkillCategory::Farming),
        AgentAction::GatherWood
        | AgentAction::BuildShelter
        | AgentAction::CraftTool
        | AgentAction::ImproveCamp => Some(SkillCategory::Building),
        AgentAction::ExploreArea | AgentAction::ScoutResources | AgentAction::MapTerrain => {
            Some(SkillCategory::Exploration)
        }
        _ => None,
    }
}

/// How close another agent must be to socialize or trade with.
const SOCIAL_RANGE: f64 = 50.0;

/// Drives one agent through repeated decision cycles.
pub struct AgentCycle {
    store: Store,
    relay: Arc<dyn MessageRelay>,
    social: SocialEngine,
    trades: TradeEngine,
    agent_id: AgentId,
    phase: CyclePhase,
}

impl AgentCycle {
    /// Create an idle cycle for an agent.
    pub fn new(store: Store, relay: Arc<dyn MessageRelay>, agent_id: AgentId) -> Self {
        let social = SocialEngine::new(store.clone());
        let trades = TradeEngine::new(store.clone());
        Self {
            store,
            relay,
            social,
            trades,
            agent_id,
            phase: CyclePhase::Idle,
        }
    }

    /// The agent this cycle drives.
    pub const fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    /// Current phase, for snapshots and logs.
    pub const fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Run one tick.
    ///
    /// Busy and cooling-down agents skip the tick. A driver failure on
    /// observation falls back to a calm default context so the agent
    /// still decides; a failure or timeout on execution marks the action
    /// unsuccessful rather than erroring the cycle.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if reading or writing agent state
    /// fails.
    pub async fn run<R: Rng>(
        &mut self,
        driver: &dyn WorldDriver,
        rng: &mut R,
        action_timeout: Duration,
        now: DateTime<Utc>,
    ) -> Result<CycleOutcome, CoreError> {
        match self.phase {
            CyclePhase::Acting => return Ok(CycleOutcome::Skipped),
            CyclePhase::CoolingDown => {
                self.phase = CyclePhase::Idle;
                return Ok(CycleOutcome::Skipped);
            }
            CyclePhase::Idle => {}
        }
        self.phase = CyclePhase::Acting;
        let result = self.act(driver, rng, action_timeout, now).await;
        self.phase = CyclePhase::CoolingDown;
        result
    }

    async fn act<R: Rng>(
        &self,
        driver: &dyn WorldDriver,
        rng: &mut R,
        action_timeout: Duration,
        now: DateTime<Utc>,
    ) -> Result<CycleOutcome, CoreError> {
        self.read_mail(rng, now);

        let ctx = match driver.observe(self.agent_id).await {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!(agent_id = %self.agent_id, %err, "observation failed, using fallback context");
                WorldContext::calm_daytime()
            }
        };

        let personality = self.store.agent(self.agent_id)?.personality;
        let mut emotions = self.store.latest_emotions(self.agent_id, now)?;
        let position = self.store.status(self.agent_id)?.position;
        let choice = choose_action(&personality, &emotions, &ctx, rng);

        let attempt = executor::execute(driver, self.agent_id, position, choice.action, rng);
        let performed = match tokio::time::timeout(action_timeout, attempt).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                warn!(agent_id = %self.agent_id, action = %choice.action, %err, "action failed");
                false
            }
            Err(_) => {
                warn!(agent_id = %self.agent_id, action = %choice.action, "action timed out");
                false
            }
        };

        // Social and trading actions run through their engines; the world
        // call above is only the audible side.
        let success = match choice.action {
            action if action.category() == ActionCategory::Social => {
                performed && self.socialize(action, rng, now)?
            }
            AgentAction::OfferTrade => performed && self.negotiate(now)?,
            _ => performed,
        };

        emotion::apply_action_outcome(&mut emotions, choice.action, success, now);
        self.store.append_emotions(self.agent_id, emotions)?;
        if success {
            if let Some(skill) = practice_target(choice.action) {
                self.store
                    .append_memory(skills::practice_memory(self.agent_id, skill, now))?;
            }
        }

        debug!(
            agent_id = %self.agent_id,
            action = %choice.action,
            utility = %choice.utility,
            success,
            "cycle complete"
        );
        Ok(CycleOutcome::Acted { choice, success })
    }

    /// The closest live agent within [`SOCIAL_RANGE`], if any.
    fn nearest_neighbor(&self) -> Result<Option<AgentId>, CoreError> {
        let me = self.store.status(self.agent_id)?;
        let mut best: Option<(AgentId, f64)> = None;
        for agent in self.store.agents()? {
            if agent.id == self.agent_id {
                continue;
            }
            let status = self.store.status(agent.id)?;
            let distance = me.position.distance_to(status.position);
            if distance <= SOCIAL_RANGE && best.is_none_or(|(_, closest)| distance < closest) {
                best = Some((agent.id, distance));
            }
        }
        Ok(best.map(|(id, _)| id))
    }

    /// Run a social action through the interaction engine.
    ///
    /// With nobody in range the action fails; otherwise success means the
    /// interaction landed positively. The partner also hears a line
    /// through the relay.
    fn socialize<R: Rng>(
        &self,
        action: AgentAction,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<bool, CoreError> {
        let Some(partner) = self.nearest_neighbor()? else {
            debug!(agent_id = %self.agent_id, "nobody within social range");
            return Ok(false);
        };
        let kind = match action {
            AgentAction::OfferHelp => InteractionKind::HelpOffer,
            AgentAction::ShareNews => InteractionKind::ShareDiscovery,
            _ => InteractionKind::Greeting,
        };
        let report = self.social.interact(self.agent_id, partner, kind, rng, now)?;
        let line = match kind {
            InteractionKind::HelpOffer => "need a hand with anything?",
            InteractionKind::ShareDiscovery => "wait until you hear what i found",
            _ => "good to see you",
        };
        self.post(
            partner,
            RelayMessage::DirectMessage {
                text: line.to_owned(),
            },
            now,
        );
        Ok(report.outcome == InteractionOutcome::Positive)
    }

    /// Propose a trade to the nearest neighbor.
    ///
    /// The proposal is recorded in flight and the partner is notified
    /// through the relay; they answer when they next read their mail.
    /// The action succeeds once the offer is on its way.
    fn negotiate(&self, now: DateTime<Utc>) -> Result<bool, CoreError> {
        let Some(partner) = self.nearest_neighbor()? else {
            debug!(agent_id = %self.agent_id, "nobody within trading range");
            return Ok(false);
        };
        let offer = vec![ItemStack::new("wood", 3)];
        let request = vec![ItemStack::new("bread", 1)];
        let trade = self.trades.propose(self.agent_id, partner, offer, request, now)?;
        self.post(partner, RelayMessage::TradeOffer { trade_id: trade.id }, now);
        Ok(true)
    }

    /// Answer everything in the mailbox.
    ///
    /// Trade offers are judged immediately, with counters bouncing back
    /// to the proposer; help and alliance requests get a social response;
    /// chat lines are only heard. A stale or unreadable message is
    /// dropped with a note, never an error: mail must not fail the cycle.
    fn read_mail<R: Rng>(&self, rng: &mut R, now: DateTime<Utc>) {
        for envelope in self.relay.drain(self.agent_id) {
            let from = envelope.from;
            let result = match envelope.payload {
                RelayMessage::TradeOffer { trade_id } => self.answer_trade(from, trade_id, now),
                RelayMessage::HelpRequest { .. } => self
                    .social
                    .interact(self.agent_id, from, InteractionKind::HelpOffer, rng, now)
                    .map(|_| ()),
                RelayMessage::AllianceRequest => self
                    .social
                    .interact(
                        self.agent_id,
                        from,
                        InteractionKind::AllianceProposal,
                        rng,
                        now,
                    )
                    .map(|_| ()),
                RelayMessage::DirectMessage { text } | RelayMessage::Broadcast { text } => {
                    debug!(agent_id = %self.agent_id, %from, %text, "heard");
                    Ok(())
                }
            };
            if let Err(err) = result {
                debug!(agent_id = %self.agent_id, %from, %err, "message dropped");
            }
        }
    }

    /// Judge an offered trade from the mailbox.
    fn answer_trade(
        &self,
        proposer: AgentId,
        trade_id: TradeId,
        now: DateTime<Utc>,
    ) -> Result<(), AgentError> {
        match self.trades.evaluate(trade_id, now)? {
            TradeDecision::Accept => {
                self.trades.complete(trade_id, now)?;
            }
            TradeDecision::Counter(counter) => {
                self.post(proposer, RelayMessage::TradeOffer { trade_id: counter.id }, now);
            }
            TradeDecision::Reject => {
                self.trades.reject(trade_id, now)?;
            }
        }
        Ok(())
    }

    fn post(&self, to: AgentId, payload: RelayMessage, now: DateTime<Utc>) {
        self.relay.send(MessageEnvelope {
            id: MessageId::new(),
            from: self.agent_id,
            to: Some(to),
            payload,
            sent_at: now,
        });
    }
}
