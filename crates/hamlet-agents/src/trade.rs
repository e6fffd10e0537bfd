//! Trade valuation and negotiation.
//!
//! Item values are subjective: a fixed catalogue gives base values, and
//! each agent's personality scales what it cares about. Fairness is the
//! ratio of what you receive to what you give, both judged through the
//! evaluator's eyes. Acceptance thresholds bend with trust, empathy,
//! ambition, and need, and a rejected-but-close offer earns a counter
//! instead of a flat refusal.

use chrono::{DateTime, Duration, Utc};
use hamlet_store::Store;
use hamlet_types::{
    AgentId, EventId, EventKind, ItemStack, Memory, MemoryKind, Personality, StoredEvent, Trade,
    TradeId, TradeStatus,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::error::AgentError;

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// Base catalogue value of one item. Unknown items default to 10.
pub fn base_value(item: &str) -> Decimal {
    let value: u32 = match item {
        "diamond" => 100,
        "emerald" => 80,
        "gold_ingot" => 60,
        "iron_ingot" => 30,
        "coal" => 10,
        "stone" => 5,
        "oak_log" => 8,
        "wheat" => 6,
        "bread" => 12,
        "cooked_beef" => 15,
        "golden_apple" => 50,
        "diamond_sword" => 250,
        "diamond_pickaxe" => 300,
        "dirt" => 1,
        _ => 10,
    };
    Decimal::from(value)
}

/// Personality-driven desire multiplier for one item.
///
/// Starts at 1.0; precious items pull on ambition, food on empathy,
/// weapons on aggression, and raw building stock on work ethic.
pub fn desire_multiplier(item: &str, personality: &Personality) -> Decimal {
    let mut mult = Decimal::ONE;
    if item.contains("diamond") || item.contains("emerald") {
        mult = mult.saturating_add(personality.ambition.saturating_mul(Decimal::new(5, 1)));
    }
    if is_food(item) {
        mult = mult.saturating_add(personality.empathy.saturating_mul(Decimal::new(3, 1)));
    }
    if item.contains("sword") || item.contains("armor") {
        mult = mult.saturating_add(personality.aggression.saturating_mul(Decimal::new(4, 1)));
    }
    if item.contains("_log") || item.contains("plank") {
        mult = mult.saturating_add(personality.work_ethic.saturating_mul(Decimal::new(2, 1)));
    }
    mult
}

/// Value of one stack through an evaluator's eyes.
///
/// Per-unit value is floored to whole points before multiplying by the
/// stack size, matching how agents haggle in round numbers.
pub fn perceived_value(
    stack: &ItemStack,
    personality: &Personality,
    supply_demand: Decimal,
) -> Decimal {
    let unit = base_value(&stack.item)
        .saturating_mul(desire_multiplier(&stack.item, personality))
        .saturating_mul(supply_demand)
        .floor();
    unit.saturating_mul(Decimal::from(stack.count))
}

/// Total value of a bundle of stacks.
pub fn bundle_value(
    stacks: &[ItemStack],
    personality: &Personality,
    supply_demand: Decimal,
) -> Decimal {
    stacks.iter().fold(Decimal::ZERO, |total, stack| {
        total.saturating_add(perceived_value(stack, personality, supply_demand))
    })
}

/// Offer value over request value; a fairness of 1.0 is an even swap.
pub fn fairness(offer_value: Decimal, request_value: Decimal) -> Decimal {
    let divisor = request_value.max(Decimal::ONE);
    offer_value.checked_div(divisor).unwrap_or(Decimal::ZERO)
}

fn is_food(item: &str) -> bool {
    item.contains("bread")
        || item.contains("beef")
        || item.contains("wheat")
        || item.contains("apple")
}

/// How much the evaluator needs the offered items, in [0, 1].
///
/// Food counts only when the evaluator is actually hungry; tools and raw
/// precious metals are always somewhat wanted.
pub fn need_score(offered: &[ItemStack], food: Decimal) -> Decimal {
    let hungry = food < Decimal::from(10_u32);
    let mut score = Decimal::ZERO;
    for stack in offered {
        if hungry && is_food(&stack.item) {
            score = score.saturating_add(Decimal::new(3, 1));
        }
        if stack.item.contains("pickaxe")
            || stack.item.contains("axe")
            || stack.item.contains("sword")
        {
            score = score.saturating_add(Decimal::new(2, 1));
        }
        if stack.item == "diamond" || stack.item == "iron_ingot" {
            score = score.saturating_add(Decimal::new(15, 2));
        }
    }
    score.min(Decimal::ONE)
}

/// Minimum fairness the evaluator will accept.
///
/// Starts at 0.8; high trust and empathy soften it, high ambition
/// hardens it, and genuine need discounts it further.
pub fn acceptance_threshold(personality: &Personality, trust: Decimal, need: Decimal) -> Decimal {
    let mut threshold = Decimal::new(8, 1);
    if trust > Decimal::new(7, 1) {
        threshold = threshold.saturating_sub(Decimal::new(2, 1));
    }
    if personality.empathy > Decimal::new(7, 1) {
        threshold = threshold.saturating_sub(Decimal::new(1, 1));
    }
    if personality.ambition > Decimal::new(8, 1) {
        threshold = threshold.saturating_add(Decimal::new(1, 1));
    }
    threshold.saturating_sub(need.saturating_mul(Decimal::new(2, 1)))
}

/// How long an unanswered proposal stays alive before being swept.
pub fn proposal_max_age() -> Duration {
    Duration::minutes(5)
}

// ---------------------------------------------------------------------------
// TradeEngine
// ---------------------------------------------------------------------------

/// The evaluator's verdict on a proposal.
#[derive(Debug, Clone)]
pub enum TradeDecision {
    /// The offer clears the threshold.
    Accept,
    /// The offer is too lopsided to even haggle over.
    Reject,
    /// Close but not fair enough: a replacement proposal with a reduced
    /// request, already stored in flight.
    Counter(Trade),
}

/// Store-backed trade negotiation for all agents.
#[derive(Debug, Clone)]
pub struct TradeEngine {
    store: Store,
}

impl TradeEngine {
    /// Create an engine over the shared store.
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Propose a trade and record it in flight.
    ///
    /// Both sides of the bundle are valued through the target's eyes,
    /// since the target is the one who must judge the deal.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::SelfInteraction`] for self-trades, or
    /// [`AgentError::Store`] on store failures.
    pub fn propose(
        &self,
        proposer: AgentId,
        target: AgentId,
        offer: Vec<ItemStack>,
        request: Vec<ItemStack>,
        now: DateTime<Utc>,
    ) -> Result<Trade, AgentError> {
        if proposer == target {
            return Err(AgentError::SelfInteraction(proposer));
        }
        let personality = self.store.agent(target)?.personality;
        let offer_value = bundle_value(&offer, &personality, Decimal::ONE);
        let request_value = bundle_value(&request, &personality, Decimal::ONE);
        let trade = Trade {
            id: TradeId::new(),
            proposer,
            target,
            offer,
            request,
            offer_value,
            request_value,
            fairness: fairness(offer_value, request_value),
            status: TradeStatus::Proposed,
            created_at: now,
        };
        debug!(trade_id = %trade.id, %proposer, %target, fairness = %trade.fairness, "trade proposed");
        self.store.put_trade(trade.clone())?;
        Ok(trade)
    }

    /// Evaluate an in-flight proposal from the target's point of view.
    ///
    /// Accepts when fairness clears the threshold. Rejects outright when
    /// fairness is at or below 0.5. In between, the target counters: the
    /// original proposal is dropped and replaced with one whose request
    /// is scaled down toward the target's desired fairness
    /// (`0.9 + empathy * 0.1`).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Store`] if the trade or the target cannot be
    /// read, including when the proposal was already swept.
    pub fn evaluate(&self, trade_id: TradeId, now: DateTime<Utc>) -> Result<TradeDecision, AgentError> {
        let trade = self.store.trade(trade_id)?;
        let personality = self.store.agent(trade.target)?.personality;
        let trust = self
            .store
            .relationship(trade.proposer, trade.target)?
            .map_or_else(|| Decimal::new(5, 1), |r| r.trust);
        let food = self.store.status(trade.target)?.food;
        let need = need_score(&trade.offer, food);
        let threshold = acceptance_threshold(&personality, trust, need);

        if trade.fairness >= threshold {
            return Ok(TradeDecision::Accept);
        }
        if trade.fairness <= Decimal::new(5, 1) {
            return Ok(TradeDecision::Reject);
        }

        let desired = Decimal::new(9, 1)
            .saturating_add(personality.empathy.saturating_mul(Decimal::new(1, 1)));
        let scale = trade
            .fairness
            .checked_div(desired)
            .unwrap_or(Decimal::ONE)
            .min(Decimal::ONE);
        let request: Vec<ItemStack> = trade
            .request
            .iter()
            .map(|stack| {
                let scaled = Decimal::from(stack.count)
                    .saturating_mul(scale)
                    .floor()
                    .to_u32()
                    .unwrap_or(1)
                    .max(1);
                ItemStack::new(stack.item.clone(), scaled)
            })
            .collect();

        // The original proposal dies quietly; no relationship effect.
        self.store.resolve_trade(trade.id, TradeStatus::Rejected)?;
        let counter = self.propose(trade.proposer, trade.target, trade.offer, request, now)?;
        Ok(TradeDecision::Counter(counter))
    }

    /// Complete an accepted trade.
    ///
    /// Builds a little trust between the pair and leaves both agents a
    /// trade memory, plus a completed-trade entry in the event log.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Store`] if the trade is unknown or already
    /// resolved.
    pub fn complete(&self, trade_id: TradeId, now: DateTime<Utc>) -> Result<Trade, AgentError> {
        let trade = self.store.resolve_trade(trade_id, TradeStatus::Accepted)?;
        self.store.apply_relationship_delta(
            trade.proposer,
            trade.target,
            Decimal::ZERO,
            Decimal::new(5, 2), // +0.05 trust
            now,
        )?;
        let importance = Decimal::new(66, 2); // 0.6 base, positive outcome
        let content = serde_json::json!({
            "trade_id": trade.id,
            "fairness": trade.fairness,
            "completed": true,
        });
        self.store.append_memory(
            Memory::new(trade.proposer, MemoryKind::Trade, content.clone(), importance, now)
                .with_related(trade.target),
        )?;
        self.store.append_memory(
            Memory::new(trade.target, MemoryKind::Trade, content, importance, now)
                .with_related(trade.proposer),
        )?;
        self.store.append_event(StoredEvent {
            id: EventId::new(),
            kind: EventKind::TradeCompleted,
            description: String::from("trade completed"),
            agent_id: Some(trade.proposer),
            village_id: None,
            metadata: serde_json::json!({ "trade_id": trade.id, "target": trade.target }),
            recorded_at: now,
        })?;
        Ok(trade)
    }

    /// Reject an in-flight trade.
    ///
    /// Both agents remember the refusal, but the relationship itself is
    /// untouched -- declining a deal is not an offense.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Store`] if the trade is unknown or already
    /// resolved.
    pub fn reject(&self, trade_id: TradeId, now: DateTime<Utc>) -> Result<Trade, AgentError> {
        let trade = self.store.resolve_trade(trade_id, TradeStatus::Rejected)?;
        let importance = Decimal::new(72, 2); // 0.6 base, negative outcome
        let content = serde_json::json!({
            "trade_id": trade.id,
            "fairness": trade.fairness,
            "completed": false,
        });
        self.store.append_memory(
            Memory::new(trade.proposer, MemoryKind::Trade, content.clone(), importance, now)
                .with_related(trade.target),
        )?;
        self.store.append_memory(
            Memory::new(trade.target, MemoryKind::Trade, content, importance, now)
                .with_related(trade.proposer),
        )?;
        Ok(trade)
    }

    /// Sweep proposals that sat unanswered past [`proposal_max_age`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Store`] on store failures.
    pub fn sweep_stale(&self, now: DateTime<Utc>) -> Result<usize, AgentError> {
        Ok(self.store.sweep_stale_trades(now, proposal_max_age())?)
    }
}
