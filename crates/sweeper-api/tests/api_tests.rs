//! Integration tests for the Sweeper API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::StreamExt as _;
use serde_json::{Value, json};
use sweeper_api::state::AppState;
use sweeper_api::{build_router, serve};
use sweeper_core::SimulationEngine;
use sweeper_core::config::SimulationSettings;
use sweeper_db::{MemoryStore, Store};
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tower::ServiceExt;

const ALICE_ID: &str = "11111111-1111-1111-1111-111111111111";

fn engine() -> Arc<SimulationEngine> {
    let settings = SimulationSettings {
        seed: Some(7),
        ..SimulationSettings::default()
    };
    Arc::new(SimulationEngine::from_settings(&settings))
}

async fn make_test_state() -> Arc<AppState> {
    let store = Store::Memory(MemoryStore::seeded().await.unwrap());
    Arc::new(AppState::new(engine(), store))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// =========================================================================
// Auth
// =========================================================================

#[tokio::test]
async fn test_login_seeded_user() {
    let router = build_router(make_test_state().await);

    let (status, json) = send(
        router,
        post_json(
            "/auth/login",
            &json!({"email": "alice@example.com", "password": "pass"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["user"]["username"], "alice");
    assert_eq!(json["user"]["id"], ALICE_ID);
    assert!(json["user"]["createdAt"].is_string());
    assert!(json["user"].get("password").is_none());
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_login_rejections_are_in_band() {
    let state = make_test_state().await;

    let (status, json) = send(
        build_router(Arc::clone(&state)),
        post_json(
            "/auth/login",
            &json!({"email": "alice@example.com", "password": "nope"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Invalid password");

    let (_, json) = send(
        build_router(state),
        post_json(
            "/auth/login",
            &json!({"email": "ghost@example.com", "password": "pass"}),
        ),
    )
    .await;
    assert_eq!(json["error"], "User not found");
    assert!(json.get("user").is_none());
}

#[tokio::test]
async fn test_signup_then_duplicates() {
    let state = make_test_state().await;
    let body = json!({"username": "carol", "email": "carol@example.com", "password": "pw"});

    let (status, json) = send(build_router(Arc::clone(&state)), post_json("/auth/signup", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["user"]["email"], "carol@example.com");

    let (_, json) = send(build_router(Arc::clone(&state)), post_json("/auth/signup", &body)).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Email already registered");

    let (_, json) = send(
        build_router(state),
        post_json(
            "/auth/signup",
            &json!({"username": "alice", "email": "new@example.com", "password": "pw"}),
        ),
    )
    .await;
    assert_eq!(json["error"], "Username already taken");
}

#[tokio::test]
async fn test_signup_validation() {
    let state = make_test_state().await;

    let (status, json) = send(
        build_router(Arc::clone(&state)),
        post_json(
            "/auth/signup",
            &json!({"username": "dave", "email": "not-an-email", "password": "pw"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["status"], 422);
    assert!(json["error"].as_str().unwrap().contains("email"));

    let (status, _) = send(
        build_router(Arc::clone(&state)),
        post_json(
            "/auth/signup",
            &json!({"username": "", "email": "dave@example.com", "password": "pw"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, json) = send(
        build_router(state),
        post_json("/auth/signup", &json!({"username": "dave"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let router = build_router(make_test_state().await);
    let request = Request::post("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, json) = send(router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_logout_no_content() {
    let router = build_router(make_test_state().await);
    let response = router
        .oneshot(Request::post("/auth/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_me_requires_known_user() {
    let state = make_test_state().await;

    let (status, json) = send(
        build_router(Arc::clone(&state)),
        Request::get("/auth/me").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({"error": "Not authenticated", "status": 401}));

    for bad in ["garbage", "33333333-3333-3333-3333-333333333333"] {
        let (status, _) = send(
            build_router(Arc::clone(&state)),
            Request::get("/auth/me")
                .header("x-user-id", bad)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "id {bad}");
    }

    let (status, json) = send(
        build_router(state),
        Request::get("/auth/me")
            .header("x-user-id", ALICE_ID)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["username"], "alice");
    assert_eq!(json["email"], "alice@example.com");
}

#[tokio::test]
async fn test_users_lists_everyone_for_known_caller() {
    let state = make_test_state().await;

    let (status, _) = send(
        build_router(Arc::clone(&state)),
        Request::get("/users").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, signup) = send(
        build_router(Arc::clone(&state)),
        post_json(
            "/auth/signup",
            &json!({"username": "erin", "email": "erin@example.com", "password": "pw"}),
        ),
    )
    .await;
    assert_eq!(signup["success"], true);

    let (status, json) = send(
        build_router(state),
        Request::get("/users")
            .header("x-user-id", ALICE_ID)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let users = json.as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[0]["username"], "erin");
}

// =========================================================================
// Leaderboard
// =========================================================================

#[tokio::test]
async fn test_leaderboard_default_limit_and_order() {
    let router = build_router(make_test_state().await);

    let (status, json) = send(
        router,
        Request::get("/leaderboard").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 8);
    assert_eq!(entries[0]["username"], "SpeedRunner");
    assert_eq!(entries[0]["time"], 42);
    assert_eq!(entries[0]["difficulty"], "easy");
    let times: Vec<u64> = entries.iter().map(|e| e["time"].as_u64().unwrap()).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_leaderboard_limit() {
    let state = make_test_state().await;

    let (_, json) = send(
        build_router(Arc::clone(&state)),
        Request::get("/leaderboard?limit=2").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (status, json) = send(
        build_router(state),
        Request::get("/leaderboard?limit=5000").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_submit_score_created_and_ranked() {
    let state = make_test_state().await;

    let (status, entry) = send(
        build_router(Arc::clone(&state)),
        post_json(
            "/leaderboard",
            &json!({"username": "Zippy", "time": 30, "difficulty": "hard"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["username"], "Zippy");
    assert_eq!(entry["difficulty"], "hard");
    assert!(entry["id"].is_string());
    assert!(entry["date"].is_string());

    let (_, json) = send(
        build_router(state),
        Request::get("/leaderboard?limit=1").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(json[0], entry);
}

#[tokio::test]
async fn test_submit_score_rejects_unknown_difficulty() {
    let router = build_router(make_test_state().await);
    let (status, json) = send(
        router,
        post_json(
            "/leaderboard",
            &json!({"username": "Zippy", "time": 30, "difficulty": "nightmare"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["status"], 422);
}

// =========================================================================
// Spectator
// =========================================================================

#[tokio::test]
async fn test_spectator_active_starts_simulation() {
    let state = make_test_state().await;
    assert!(!state.engine.is_running().await);

    let (status, json) = send(
        build_router(Arc::clone(&state)),
        Request::get("/spectator/active").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let players = json.as_array().unwrap();
    let names: Vec<&str> = players
        .iter()
        .map(|p| p["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["SweeperPro", "MineHunter", "FlagQueen", "BombSquad"]);
    assert_eq!(players[0]["minesCount"], 10);
    assert_eq!(players[0]["board"].as_array().unwrap().len(), 9);
    assert!(players[0]["board"][0][0].get("neighborMines").is_some());
    assert!(state.engine.is_running().await);

    state.engine.shutdown().await;
}

#[tokio::test]
async fn test_spectator_get_player() {
    let state = make_test_state().await;
    let id = state.engine.list_active_sessions()[2].id;

    let (status, json) = send(
        build_router(Arc::clone(&state)),
        Request::get(format!("/spectator/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["username"], "FlagQueen");
    assert_eq!(json["id"], id.to_string());
    assert!(state.engine.is_running().await);

    for missing in ["00000000-0000-0000-0000-000000000000", "not-a-uuid"] {
        let (status, json) = send(
            build_router(Arc::clone(&state)),
            Request::get(format!("/spectator/{missing}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({"error": "Player not found", "status": 404}));
    }
}

#[tokio::test(start_paused = true)]
async fn test_spectator_stream_pushes_roster() {
    // No seeded accounts: argon2 work on the blocking pool would race the
    // paused clock.
    let state = Arc::new(AppState::new(engine(), Store::Memory(MemoryStore::new())));
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(Request::get("/spectator/stream").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("text/event-stream"));
    assert!(state.engine.is_running().await);

    let mut frames = response.into_body().into_data_stream();
    for _ in 0..2 {
        let frame = frames.next().await.unwrap().unwrap();
        let text = std::str::from_utf8(&frame).unwrap();
        let payload = text
            .strip_prefix("data: ")
            .and_then(|rest| rest.strip_suffix("\n\n"))
            .unwrap();
        let players: Value = serde_json::from_str(payload).unwrap();
        assert_eq!(players.as_array().unwrap().len(), 4);
    }

    drop(frames);
    assert!(state.engine.shutdown().await);
}

#[tokio::test(start_paused = true)]
async fn test_spectator_stream_ends_when_closing() {
    let state = Arc::new(AppState::new(engine(), Store::Memory(MemoryStore::new())));
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(Request::get("/spectator/stream").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let mut frames = response.into_body().into_data_stream();

    let first = frames.next().await.unwrap().unwrap();
    assert!(first.starts_with(b"data: "));

    state.closing.cancel();
    assert!(frames.next().await.is_none());
}

#[tokio::test]
async fn test_shutdown_completes_with_open_stream() {
    let state = Arc::new(AppState::new(engine(), Store::Memory(MemoryStore::new())));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(serve(listener, Arc::clone(&state), async move {
        let _ = stop_rx.await;
    }));

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(b"GET /spectator/stream HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    let mut buf = vec![0_u8; 4096];
    let n = client.read(&mut buf).await.unwrap();
    assert!(String::from_utf8_lossy(&buf[..n]).starts_with("HTTP/1.1 200"));

    stop_tx.send(()).unwrap();
    let served = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server kept running with a stream open");
    served.unwrap().unwrap();

    assert!(state.closing.is_cancelled());
    assert!(state.engine.shutdown().await);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let router = build_router(make_test_state().await);
    let response = router
        .oneshot(
            Request::get("/leaderboard")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
