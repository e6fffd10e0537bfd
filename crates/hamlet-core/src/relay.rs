//! Best-effort message passing between agents.
//!
//! Delivery is fire-and-forget: a dropped message never fails the
//! sender's cycle. Recipients pull their inbox when they next act.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use hamlet_types::{AgentId, MessageEnvelope};
use tracing::trace;

/// Per-inbox cap; the oldest messages are dropped first once full.
const INBOX_CAPACITY: usize = 64;

/// Best-effort transport for [`MessageEnvelope`]s.
pub trait MessageRelay: Send + Sync {
    /// Queue a message for delivery.
    ///
    /// Unknown recipients and full inboxes drop the message silently;
    /// sending never fails.
    fn send(&self, envelope: MessageEnvelope);

    /// Drain an agent's inbox, oldest first.
    fn drain(&self, agent: AgentId) -> Vec<MessageEnvelope>;
}

/// In-process relay backed by per-agent queues.
#[derive(Debug, Clone, Default)]
pub struct LocalRelay {
    inboxes: Arc<Mutex<HashMap<AgentId, VecDeque<MessageEnvelope>>>>,
}

impl LocalRelay {
    /// Create an empty relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent so it can receive messages.
    pub fn register(&self, agent: AgentId) {
        if let Ok(mut inboxes) = self.inboxes.lock() {
            inboxes.entry(agent).or_default();
        }
    }

    fn push(inbox: &mut VecDeque<MessageEnvelope>, envelope: MessageEnvelope) {
        if inbox.len() >= INBOX_CAPACITY {
            inbox.pop_front();
        }
        inbox.push_back(envelope);
    }
}

impl MessageRelay for LocalRelay {
    fn send(&self, envelope: MessageEnvelope) {
        let Ok(mut inboxes) = self.inboxes.lock() else {
            return;
        };
        match envelope.to {
            Some(recipient) => {
                if let Some(inbox) = inboxes.get_mut(&recipient) {
                    Self::push(inbox, envelope);
                } else {
                    trace!(%recipient, "message dropped, recipient unknown");
                }
            }
            None => {
                let sender = envelope.from;
                for (agent, inbox) in inboxes.iter_mut() {
                    if *agent != sender {
                        Self::push(inbox, envelope.clone());
                    }
                }
            }
        }
    }

    fn drain(&self, agent: AgentId) -> Vec<MessageEnvelope> {
        self.inboxes
            .lock()
            .ok()
            .and_then(|mut inboxes| inboxes.get_mut(&agent).map(|q| q.drain(..).collect()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use hamlet_types::{MessageId, RelayMessage};

    use super::*;

    fn envelope(from: AgentId, to: Option<AgentId>) -> MessageEnvelope {
        MessageEnvelope {
            id: MessageId::new(),
            from,
            to,
            payload: RelayMessage::Broadcast {
                text: String::from("hello"),
            },
            sent_at: Utc::now(),
        }
    }

    #[test]
    fn direct_messages_reach_only_the_recipient() {
        let relay = LocalRelay::new();
        let (a, b, c) = (AgentId::new(), AgentId::new(), AgentId::new());
        for id in [a, b, c] {
            relay.register(id);
        }
        relay.send(envelope(a, Some(b)));
        assert_eq!(relay.drain(b).len(), 1);
        assert!(relay.drain(c).is_empty());
    }

    #[test]
    fn broadcasts_skip_the_sender() {
        let relay = LocalRelay::new();
        let (a, b) = (AgentId::new(), AgentId::new());
        relay.register(a);
        relay.register(b);
        relay.send(envelope(a, None));
        assert!(relay.drain(a).is_empty());
        assert_eq!(relay.drain(b).len(), 1);
    }

    #[test]
    fn unknown_recipient_is_dropped_silently() {
        let relay = LocalRelay::new();
        let a = AgentId::new();
        relay.register(a);
        relay.send(envelope(a, Some(AgentId::new())));
        assert!(relay.drain(a).is_empty());
    }

    #[test]
    fn full_inbox_sheds_oldest_first() {
        let relay = LocalRelay::new();
        let (a, b) = (AgentId::new(), AgentId::new());
        relay.register(a);
        relay.register(b);
        for _ in 0..(INBOX_CAPACITY + 5) {
            relay.send(envelope(a, Some(b)));
        }
        assert_eq!(relay.drain(b).len(), INBOX_CAPACITY);
    }
}
