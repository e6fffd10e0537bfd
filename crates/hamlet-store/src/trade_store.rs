//! In-flight trade bookkeeping.
//!
//! Trades are ephemeral: they live here only while a negotiation is open
//! and are swept once stale. Completed and rejected trades persist as
//! memories and events, not as trade rows.

use chrono::{DateTime, Duration, Utc};
use hamlet_types::{Trade, TradeId, TradeStatus};
use tracing::debug;

use crate::backend::Store;
use crate::error::StoreError;

impl Store {
    /// Record a proposed trade.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn put_trade(&self, trade: Trade) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.trades.insert(trade.id, trade);
        Ok(())
    }

    /// Fetch one trade by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TradeNotFound`] if the id is unknown (possibly
    /// already swept).
    pub fn trade(&self, id: TradeId) -> Result<Trade, StoreError> {
        let inner = self.lock()?;
        inner.trades.get(&id).cloned().ok_or(StoreError::TradeNotFound(id))
    }

    /// Resolve a trade and drop it from the in-flight table, returning the
    /// final record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TradeNotFound`] if the id is unknown.
    pub fn resolve_trade(&self, id: TradeId, status: TradeStatus) -> Result<Trade, StoreError> {
        let mut inner = self.lock()?;
        let mut trade = inner.trades.remove(&id).ok_or(StoreError::TradeNotFound(id))?;
        trade.status = status;
        Ok(trade)
    }

    /// Drop trades still unresolved after `max_age`. Returns how many were
    /// swept.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if the backend lock is poisoned.
    pub fn sweep_stale_trades(
        &self,
        now: DateTime<Utc>,
        max_age: Duration,
    ) -> Result<usize, StoreError> {
        let mut inner = self.lock()?;
        let Some(cutoff) = now.checked_sub_signed(max_age) else {
            return Ok(0);
        };
        let before = inner.trades.len();
        inner.trades.retain(|_, t| t.created_at >= cutoff);
        let swept = before.saturating_sub(inner.trades.len());
        if swept > 0 {
            debug!(swept, "stale trades swept");
        }
        Ok(swept)
    }
}
