//! Shared event-log operations.

use hamlet_types::{EventKind, StoredEvent, VillageId};

use crate::backend::Store;
use crate::error::StoreError;

impl Store {
    /// Append an event to the shared log.
    ///
    /// The log is append-only; nothing ever rewrites or removes entries.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn append_event(&self, event: StoredEvent) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.events.push(event);
        Ok(())
    }

    /// The newest events, newest first, optionally filtered by kind and
    /// village.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn recent_events(
        &self,
        kind: Option<EventKind>,
        village_id: Option<VillageId>,
        limit: usize,
    ) -> Result<Vec<StoredEvent>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .events
            .iter()
            .rev()
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .filter(|e| village_id.is_none_or(|v| e.village_id == Some(v)))
            .take(limit)
            .cloned()
            .collect())
    }

    /// A village's full event history in chronological order.
    ///
    /// Culture reassessment needs ordered timestamps to judge regularity,
    /// so this returns oldest first, unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn village_events(&self, village_id: VillageId) -> Result<Vec<StoredEvent>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .events
            .iter()
            .filter(|e| e.village_id == Some(village_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use hamlet_types::EventId;

    use super::*;

    fn event(kind: EventKind, village_id: Option<VillageId>) -> StoredEvent {
        StoredEvent {
            id: EventId::new(),
            kind,
            description: String::from("test event"),
            agent_id: None,
            village_id,
            metadata: serde_json::json!({}),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn filters_compose() {
        let store = Store::new();
        let village = VillageId::new();
        store.append_event(event(EventKind::TradeCompleted, Some(village))).unwrap();
        store.append_event(event(EventKind::TradeCompleted, None)).unwrap();
        store.append_event(event(EventKind::BuildCompleted, Some(village))).unwrap();

        let trades = store
            .recent_events(Some(EventKind::TradeCompleted), Some(village), 10)
            .unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(store.village_events(village).unwrap().len(), 2);
    }

    #[test]
    fn recent_events_are_newest_first() {
        let store = Store::new();
        let village = VillageId::new();
        store.append_event(event(EventKind::VillageFounded, Some(village))).unwrap();
        store.append_event(event(EventKind::LeaderElected, Some(village))).unwrap();
        let recent = store.recent_events(None, Some(village), 1).unwrap();
        assert_eq!(recent.first().unwrap().kind, EventKind::LeaderElected);
    }
}
