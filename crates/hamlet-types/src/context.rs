//! Decision-input context and relay message payloads.
//!
//! [`WorldContext`] is the snapshot an agent's cycle assembles before
//! scoring action categories. [`RelayMessage`] is the typed vocabulary of
//! the best-effort message relay between agents.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::TimeOfDay;
use crate::ids::{AgentId, MessageId, TradeId};
use crate::score;

// ---------------------------------------------------------------------------
// World context
// ---------------------------------------------------------------------------

/// Snapshot of an agent's surroundings fed into utility scoring.
///
/// Assembled once per decision cycle; the decision engine treats it as
/// read-only input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldContext {
    /// Health points on the 0-20 scale.
    pub health: Decimal,
    /// Food points on the 0-20 scale.
    pub food: Decimal,
    /// Coarse time of day.
    pub time: TimeOfDay,
    /// How many other agents are nearby.
    pub nearby_agents: u32,
    /// Whether gatherable resources were seen nearby.
    pub resources_nearby: bool,
    /// Whether the agent holds enough materials to build with.
    pub has_resources: bool,
    /// Whether the agent holds more than it needs (tradeable surplus).
    pub has_surplus: bool,
    /// Fraction of inventory space still free, in [0, 1].
    pub inventory_free: Decimal,
    /// Whether the agent stands inside a village territory.
    pub in_village: bool,
    /// Situational safety estimate in [0, 1].
    pub safety: Decimal,
}

impl WorldContext {
    /// A benign daytime context used as a fallback and in tests.
    pub fn calm_daytime() -> Self {
        Self {
            health: Decimal::from(20_u32),
            food: Decimal::from(20_u32),
            time: TimeOfDay::Day,
            nearby_agents: 0,
            resources_nearby: false,
            has_resources: false,
            has_surplus: false,
            inventory_free: Decimal::ONE,
            in_village: false,
            safety: score::neutral(),
        }
    }
}

// ---------------------------------------------------------------------------
// Relay messages
// ---------------------------------------------------------------------------

/// Typed payloads carried by the message relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayMessage {
    /// A point-to-point chat line.
    DirectMessage {
        /// The message text.
        text: String,
    },
    /// A message for every reachable agent.
    Broadcast {
        /// The message text.
        text: String,
    },
    /// Notification that a trade was proposed.
    TradeOffer {
        /// The pending trade.
        trade_id: TradeId,
    },
    /// An invitation to form an alliance.
    AllianceRequest,
    /// A plea for help with a task.
    HelpRequest {
        /// What help is needed with.
        task: String,
        /// How urgent it is, in [0, 1].
        urgency: Decimal,
    },
}

/// Envelope wrapping a relayed message with addressing and timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Unique message id.
    pub id: MessageId,
    /// The sender.
    pub from: AgentId,
    /// The recipient; `None` for broadcasts.
    pub to: Option<AgentId>,
    /// The typed payload.
    pub payload: RelayMessage,
    /// When the message was sent.
    pub sent_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn relay_message_tags_are_snake_case() {
        let msg = RelayMessage::HelpRequest {
            task: String::from("harvest"),
            urgency: score::neutral(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "help_request");
    }

    #[test]
    fn calm_daytime_is_in_range() {
        let ctx = WorldContext::calm_daytime();
        assert_eq!(ctx.inventory_free, Decimal::ONE);
        assert!(ctx.safety <= Decimal::ONE);
    }
}
