//! Integration tests for the observer API endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt`
//! without starting a TCP server, which validates handler logic and
//! routing with no live network connection.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use hamlet_observer::router::build_router;
use hamlet_observer::state::AppState;
use hamlet_store::Store;
use hamlet_types::{
    Agent, AgentId, AgentStatus, CultureStyle, EventId, EventKind, Personality, Position,
    StoredEvent, Village, VillageId,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

fn spawn(store: &Store, name: &str) -> AgentId {
    let now = Utc::now();
    let agent = Agent {
        id: AgentId::new(),
        name: name.to_owned(),
        personality: Personality::neutral(),
        created_at: now,
        retired: false,
    };
    let id = agent.id;
    store
        .insert_agent(agent, AgentStatus::full(id, Position::new(0.0, 0.0), now))
        .unwrap();
    id
}

fn make_test_state() -> (AppState, AgentId, VillageId) {
    let store = Store::new();
    let now = Utc::now();
    let ada = spawn(&store, "Ada");
    let bo = spawn(&store, "Bo");

    store
        .apply_relationship_delta(ada, bo, Decimal::new(2, 1), Decimal::new(3, 1), now)
        .unwrap();

    let village = store
        .create_village(
            Village {
                id: VillageId::new(),
                name: String::from("Oakrest"),
                center: Position::new(10.0, -4.0),
                radius: 50.0,
                population: 0,
                culture: CultureStyle::Emerging,
                founded_at: now,
            },
            &[ada, bo],
            now,
        )
        .unwrap();

    store
        .append_event(StoredEvent {
            id: EventId::new(),
            kind: EventKind::TradeCompleted,
            description: String::from("a trade closed"),
            agent_id: Some(ada),
            village_id: Some(village.id),
            metadata: serde_json::json!({}),
            recorded_at: now,
        })
        .unwrap();

    (AppState::new(store), ada, village.id)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn index_returns_html() {
    let (state, _, _) = make_test_state();
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn health_reports_ok() {
    let (state, _, _) = make_test_state();
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["agents"], 2);
}

#[tokio::test]
async fn list_agents_includes_village_membership() {
    let (state, _, village_id) = make_test_state();
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/api/agents").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["agents"][0]["name"], "Ada");
    assert_eq!(
        json["agents"][0]["village_id"],
        serde_json::to_value(village_id).unwrap()
    );
}

#[tokio::test]
async fn get_agent_returns_detail() {
    let (state, ada, _) = make_test_state();
    let router = build_router(state);

    let path = format!("/api/agents/{ada}");
    let response = router
        .oneshot(Request::get(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["name"], "Ada");
    assert!(json["personality"]["curiosity"].is_string() || json["personality"]["curiosity"].is_number());
    assert_eq!(json["skills"].as_object().unwrap().len(), 6);
}

#[tokio::test]
async fn unknown_agent_is_404() {
    let (state, _, _) = make_test_state();
    let router = build_router(state);

    let path = format!("/api/agents/{}", AgentId::new());
    let response = router
        .oneshot(Request::get(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_agent_id_is_400() {
    let (state, _, _) = make_test_state();
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::get("/api/agents/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_villages_shows_members() {
    let (state, _, _) = make_test_state();
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/api/villages").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["villages"][0]["name"], "Oakrest");
    assert_eq!(json["villages"][0]["population"], 2);
    assert_eq!(json["villages"][0]["members"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn events_filter_by_kind() {
    let (state, _, _) = make_test_state();
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::get("/api/events?kind=trade_completed")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);

    let response = build_router(make_test_state().0)
        .oneshot(
            Request::get("/api/events?kind=village_founded")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn unknown_event_kind_is_400() {
    let (state, _, _) = make_test_state();
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::get("/api/events?kind=solar_eclipse")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn relationships_name_the_counterpart() {
    let (state, ada, _) = make_test_state();
    let router = build_router(state);

    let path = format!("/api/relationships/{ada}");
    let response = router
        .oneshot(Request::get(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["relationships"][0]["name"], "Bo");
}

#[tokio::test]
async fn relationships_for_unknown_agent_is_404() {
    let (state, _, _) = make_test_state();
    let router = build_router(state);

    let path = format!("/api/relationships/{}", AgentId::new());
    let response = router
        .oneshot(Request::get(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
