//! Engine entry point.
//!
//! Startup order: load configuration, initialize tracing, seed the
//! world with agents, replay any offline gap recorded in the state
//! file, then run the scheduler and the observer API side by side
//! until a shutdown signal arrives. The wall-clock timestamp is
//! persisted on exit so the next start can compress the downtime.

mod error;
mod spawner;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use hamlet_core::{AgentRegistry, NullDriver, Scheduler, SimConfig, WorldDriver, catch_up};
use hamlet_observer::start_server;
use hamlet_store::Store;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable naming an alternate config file.
const CONFIG_ENV: &str = "HAMLET_CONFIG";

/// Default config path, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "hamlet-config.yaml";

/// File recording the last wall-clock moment the engine was alive.
const STATE_FILE: &str = "hamlet-state.json";

/// Persisted engine state, written on shutdown and read on startup.
#[derive(Debug, Serialize, Deserialize)]
struct EngineState {
    /// When the engine last ran.
    last_seen: DateTime<Utc>,
}

/// Load configuration from `HAMLET_CONFIG` or the default path. A
/// missing file yields the built-in defaults; a present but malformed
/// file is an error.
fn load_config() -> Result<SimConfig, error::EngineError> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let path = Path::new(&path);
    if path.exists() {
        Ok(SimConfig::from_file(path)?)
    } else {
        Ok(SimConfig::default())
    }
}

fn read_last_seen(path: &Path) -> Option<DateTime<Utc>> {
    let contents = std::fs::read_to_string(path).ok()?;
    let state: EngineState = serde_json::from_str(&contents).ok()?;
    Some(state.last_seen)
}

fn write_last_seen(path: &Path, last_seen: DateTime<Utc>) {
    let state = EngineState { last_seen };
    match serde_json::to_string_pretty(&state) {
        Ok(body) => {
            if let Err(err) = std::fs::write(path, body) {
                warn!(error = %err, "failed to persist engine state");
            }
        }
        Err(err) => warn!(error = %err, "failed to serialize engine state"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_target(true)
        .init();

    info!(world = %config.world.name, seed = config.world.seed, "engine starting");

    let store = Store::new();
    let registry = AgentRegistry::new(store.clone());
    let mut rng = StdRng::seed_from_u64(config.world.seed);
    let seed_count = config
        .population
        .initial_agents
        .min(config.population.max_agents);
    let spawned = spawner::spawn_seed_agents(&registry, seed_count, &mut rng)
        .context("failed to seed the world")?;
    info!(count = spawned.len(), "world seeded");

    let state_path = Path::new(STATE_FILE);
    if let Some(last_seen) = read_last_seen(state_path) {
        let report = catch_up(&store, &config.offline, &mut rng, last_seen, Utc::now())?;
        if let Some(report) = report {
            info!(
                hours = report.hours,
                agents = report.agents_processed,
                memories = report.memories_written,
                world_events = report.world_events,
                "offline gap compressed"
            );
        }
    }

    let driver: Arc<dyn WorldDriver> = Arc::new(NullDriver);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let bind_addr = config.server.bind_addr.clone();
    let scheduler = Scheduler::new(store.clone(), driver, config);
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    let server_store = store;
    let mut server_handle =
        tokio::spawn(async move { start_server(&bind_addr, server_store).await });

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                error!(error = %err, "failed to listen for shutdown signal");
            }
            info!("shutdown requested");
        }
        result = &mut server_handle => {
            match result {
                Ok(Ok(())) => warn!("observer server exited"),
                Ok(Err(err)) => error!(error = %err, "observer server failed"),
                Err(err) => error!(error = %err, "observer task aborted"),
            }
        }
    }

    if shutdown_tx.send(true).is_err() {
        warn!("scheduler already stopped");
    }
    match scheduler_handle.await {
        Ok(Ok(())) => info!("scheduler stopped"),
        Ok(Err(err)) => error!(error = %err, "scheduler exited with error"),
        Err(err) => error!(error = %err, "scheduler task aborted"),
    }
    server_handle.abort();

    write_last_seen(state_path, Utc::now());
    info!("engine stopped");
    Ok(())
}
