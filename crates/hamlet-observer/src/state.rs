//! Shared application state for the observer API server.

use hamlet_store::Store;

/// State injected into every handler via Axum's `State` extractor.
///
/// The observer serves reads straight from the shared [`Store`]; the
/// store's own locking keeps handlers from ever blocking the simulation
/// loops for long.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The live simulation store.
    pub store: Store,
}

impl AppState {
    /// Wrap the shared store.
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}
