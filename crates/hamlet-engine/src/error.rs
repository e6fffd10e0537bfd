//! Engine binary error type.

use hamlet_core::{ConfigError, CoreError};
use hamlet_observer::ServerError;
use hamlet_store::StoreError;

/// Errors that can abort engine startup or shutdown.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A runtime subsystem failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store operation failed during startup.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The observer server failed.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// The spawner could not seed the world.
    #[error("spawner error: {0}")]
    Spawner(String),
}
