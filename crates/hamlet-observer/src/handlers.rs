//! REST endpoint handlers for the observer API.
//!
//! All handlers are read-only projections over the live store.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/api/agents` | List agents |
//! | `GET` | `/api/agents/{id}` | Single agent detail |
//! | `GET` | `/api/villages` | List villages with members and traditions |
//! | `GET` | `/api/events` | Query the event log |
//! | `GET` | `/api/relationships/{id}` | One agent's relationship graph |

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use chrono::Utc;
use hamlet_core::snapshot;
use hamlet_types::{AgentId, EventKind, VillageId};
use uuid::Uuid;

use crate::error::ObserverError;
use crate::state::AppState;

/// Default and maximum result counts for `GET /api/events`.
const DEFAULT_EVENT_LIMIT: usize = 100;
const MAX_EVENT_LIMIT: usize = 1000;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/events` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct EventsQuery {
    /// Filter by event kind (snake_case name).
    pub kind: Option<String>,
    /// Filter by village.
    pub village_id: Option<Uuid>,
    /// Maximum number of events to return (default 100, cap 1000).
    pub limit: Option<usize>,
}

fn parse_agent_id(raw: &str) -> Result<AgentId, ObserverError> {
    Uuid::parse_str(raw)
        .map(AgentId::from)
        .map_err(|_| ObserverError::InvalidUuid(raw.to_owned()))
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing population counts and API links.
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, ObserverError> {
    let agents = state.store.agents()?.len();
    let villages = state.store.villages()?.len();
    let events = state.store.recent_events(None, None, usize::MAX)?.len();

    Ok(Html(format!(
        r"<!DOCTYPE html>
<html lang='en'>
<head><meta charset='utf-8'><title>Hamlet Observer</title></head>
<body>
    <h1>Hamlet Observer</h1>
    <p>Agents: {agents} | Villages: {villages} | Events: {events}</p>
    <ul>
        <li><a href='/api/agents'>/api/agents</a></li>
        <li><a href='/api/villages'>/api/villages</a></li>
        <li><a href='/api/events'>/api/events</a></li>
        <li><a href='/health'>/health</a></li>
    </ul>
</body>
</html>"
    )))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness probe; verifies the store lock is healthy.
pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ObserverError> {
    let agents = state.store.agents()?.len();
    Ok(Json(serde_json::json!({
        "status": "ok",
        "agents": agents,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/agents
// ---------------------------------------------------------------------------

/// List every live agent with position, vitals, and village membership.
pub async fn list_agents(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ObserverError> {
    let agents = snapshot::agent_summaries(&state.store)?;
    Ok(Json(serde_json::json!({
        "count": agents.len(),
        "agents": agents,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/agents/{id}
// ---------------------------------------------------------------------------

/// Full detail for one agent: personality, emotions, skills, memories.
pub async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let agent_id = parse_agent_id(&id)?;
    let detail = snapshot::agent_detail(&state.store, agent_id, Utc::now())?;
    Ok(Json(detail))
}

// ---------------------------------------------------------------------------
// GET /api/villages
// ---------------------------------------------------------------------------

/// List every village with members, resources, and traditions.
pub async fn list_villages(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ObserverError> {
    let villages = snapshot::village_views(&state.store)?;
    Ok(Json(serde_json::json!({
        "count": villages.len(),
        "villages": villages,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/events
// ---------------------------------------------------------------------------

/// Query the event log, newest first.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let kind = match &query.kind {
        None => None,
        Some(raw) => Some(
            serde_json::from_value::<EventKind>(serde_json::Value::String(raw.clone()))
                .map_err(|_| ObserverError::InvalidQuery(format!("unknown event kind: {raw}")))?,
        ),
    };
    let village_id = query.village_id.map(VillageId::from);
    let limit = query.limit.unwrap_or(DEFAULT_EVENT_LIMIT).min(MAX_EVENT_LIMIT);

    let events = state.store.recent_events(kind, village_id, limit)?;
    Ok(Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/relationships/{id}
// ---------------------------------------------------------------------------

/// One agent's relationship edges, strongest trust first.
pub async fn get_relationships(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let agent_id = parse_agent_id(&id)?;
    // 404 for unknown agents rather than an empty list.
    state.store.agent(agent_id)?;
    let relationships = snapshot::relationship_views(&state.store, agent_id)?;
    Ok(Json(serde_json::json!({
        "agent_id": agent_id,
        "count": relationships.len(),
        "relationships": relationships,
    })))
}
