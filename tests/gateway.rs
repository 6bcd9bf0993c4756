//! End-to-end tests: seeded in-memory store, live feeds, REST and WebSocket.

#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;

use schoolboard_gateway::api::build_app;
use schoolboard_gateway::app_state::AppState;
use schoolboard_gateway::domain::{Collection, DocumentStore, EventBus, MemoryStore, StoreError};
use schoolboard_gateway::pipeline::FixedClock;
use schoolboard_gateway::service::{DashboardService, LiveViews, ViewSettings};

struct Harness {
    app: Router,
    store: Arc<MemoryStore>,
    _feeds: LiveViews,
}

fn seed() -> Value {
    json!({
        "students": {
            "s1": {
                "name": "Ava",
                "studentId": "001",
                "attendance": ["2024-03-15"],
                "rewards": [{"dollars": 10}, {"dollars": "5"}]
            },
            "s2": {"name": "Ben", "studentId": "002", "dollarPoints": 7, "attendance": ["2024-03-14"]},
            "s3": {"name": "Cal", "studentId": "003", "dollarPoints": "3"},
            "s4": {"name": "Ava", "studentId": "004", "dollarPoints": 4, "attendance": {"2024-03-15": true}}
        },
        "notifications": [
            {"title": "Staff meeting", "audience": "Teachers", "date": {"seconds": 1_710_000_000}},
            {"title": "Picture day", "audience": "Parents", "date": {"seconds": 1_710_100_000}},
            {"title": "Spring break", "audience": "All", "date": {"seconds": 1_710_200_000}, "isImportant": true}
        ],
        "teacherProgress": [
            {"name": "Ms. Reyes", "points": 40},
            {"name": "Mr. Okafor", "dollarsGiven": "55"}
        ]
    })
}

async fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let Ok(loaded) = store.load_seed(&seed()) else {
        panic!("seed should load");
    };
    assert_eq!(loaded, 9);
    let Some(today) = NaiveDate::from_ymd_opt(2024, 3, 15) else {
        panic!("valid date");
    };
    let dashboard = Arc::new(DashboardService::new(
        Arc::clone(&store) as Arc<dyn DocumentStore>,
        EventBus::new(64),
        Arc::new(FixedClock::at_date(today)),
        ViewSettings::default(),
    ));
    let Ok(feeds) = dashboard.start() else {
        panic!("feeds should start");
    };
    let app = build_app(AppState::new(dashboard));
    let harness = Harness {
        app,
        store,
        _feeds: feeds,
    };
    wait_for_status(&harness.app, "/api/v1/overview", StatusCode::OK).await;
    wait_for_status(&harness.app, "/api/v1/leaderboard/teachers", StatusCode::OK).await;
    wait_for_status(&harness.app, "/api/v1/announcements?role=admin", StatusCode::OK).await;
    harness
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let Ok(response) = app.clone().oneshot(request).await else {
        panic!("router is infallible");
    };
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body should be readable");
    };
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let Ok(request) = Request::get(uri).body(Body::empty()) else {
        panic!("valid request");
    };
    send(app, request).await
}

async fn post_json(app: &Router, method: &str, uri: &str, body: &Value) -> (StatusCode, Value) {
    let Ok(request) = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
    else {
        panic!("valid request");
    };
    send(app, request).await
}

async fn wait_for_status(app: &Router, uri: &str, expected: StatusCode) {
    for _ in 0..100 {
        if get(app, uri).await.0 == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{uri} never returned {expected}");
}

async fn wait_for_overview(app: &Router, check: impl Fn(&Value) -> bool) -> Value {
    for _ in 0..100 {
        let (_, body) = get(app, "/api/v1/overview").await;
        if check(&body) {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("overview never reached the expected state");
}

#[tokio::test]
async fn health_and_roles() {
    let harness = harness().await;
    let (status, body) = get(&harness.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get(&harness.app, "/config/roles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn overview_before_feeds_start_is_not_ready() {
    let dashboard = Arc::new(DashboardService::new(
        Arc::new(MemoryStore::new()),
        EventBus::new(8),
        Arc::new(FixedClock::at_date(NaiveDate::MIN)),
        ViewSettings::default(),
    ));
    let app = build_app(AppState::new(dashboard));
    let (status, body) = get(&app, "/api/v1/overview").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], 2003);
}

#[tokio::test]
async fn overview_from_seeded_store() {
    let harness = harness().await;
    let (status, body) = get(&harness.app, "/api/v1/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stale"], false);
    let data = &body["data"];
    assert_eq!(data["totalStudents"], 4);
    assert_eq!(data["todayPresentCount"], 2);
    assert_eq!(data["todayAbsentCount"], 2);
    assert_eq!(data["attendancePercentage"], 50);
    assert_eq!(data["totalDollarsGiven"], 29);
    assert_eq!(
        data["topStudents"],
        json!([
            {"name": "Ava", "dollars": 19},
            {"name": "Ben", "dollars": 7},
            {"name": "Cal", "dollars": 3}
        ])
    );
}

#[tokio::test]
async fn announcements_are_filtered_by_role() {
    let harness = harness().await;

    let (status, body) = get(&harness.app, "/api/v1/announcements?role=parent").await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .map(|items| items.iter().filter_map(|a| a["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec!["Spring break", "Picture day"]);

    let (_, body) = get(&harness.app, "/api/v1/announcements?role=Teacher").await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));

    let (status, body) = get(&harness.app, "/api/v1/announcements").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1002);

    let (status, _) = get(&harness.app, "/api/v1/announcements?role=janitor").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn posted_announcement_reaches_the_feed() {
    let harness = harness().await;
    let (status, body) = post_json(
        &harness.app,
        "POST",
        "/api/v1/announcements",
        &json!({"title": "Field trip", "message": "Bring lunch", "audience": "All Students"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));

    for _ in 0..100 {
        let (_, body) = get(&harness.app, "/api/v1/announcements?role=parent").await;
        if body["data"][0]["title"] == "Field trip" {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("new announcement never reached the parent feed");
}

#[tokio::test]
async fn invalid_announcement_is_rejected() {
    let harness = harness().await;
    let (status, body) = post_json(
        &harness.app,
        "POST",
        "/api/v1/announcements",
        &json!({"title": "Oops", "audience": "Everyone"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001);
}

#[tokio::test]
async fn teacher_leaderboard_ranks_by_points() {
    let harness = harness().await;
    let (status, body) = get(&harness.app, "/api/v1/leaderboard/teachers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Mr. Okafor");
    assert_eq!(body["data"][0]["points"], 55);
    assert_eq!(body["data"][1]["rank"], 2);
}

#[tokio::test]
async fn reward_updates_progress_and_overview() {
    let harness = harness().await;
    let (status, body) = post_json(
        &harness.app,
        "POST",
        "/api/v1/students/s3/rewards",
        &json!({"dollars": 30, "reason": "Helped a classmate"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dollars"], 30);
    assert_eq!(body["recentRewards"][0]["reason"], "Helped a classmate");

    let body = wait_for_overview(&harness.app, |o| o["data"]["totalDollarsGiven"] == 56).await;
    assert_eq!(body["data"]["topStudents"][0], json!({"name": "Cal", "dollars": 30}));

    let (status, _) = post_json(
        &harness.app,
        "POST",
        "/api/v1/students/s3/rewards",
        &json!({"dollars": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn attendance_and_new_students_flow_into_overview() {
    let harness = harness().await;
    let (status, body) = post_json(
        &harness.app,
        "POST",
        "/api/v1/students/s2/attendance",
        &json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["presentToday"], true);
    wait_for_overview(&harness.app, |o| o["data"]["todayPresentCount"] == 3).await;

    let (status, _) = post_json(
        &harness.app,
        "PUT",
        "/api/v1/students/s5",
        &json!({"name": "Dee", "studentId": "005"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = wait_for_overview(&harness.app, |o| o["data"]["totalStudents"] == 5).await;
    assert_eq!(body["data"]["attendancePercentage"], 60);
}

#[tokio::test]
async fn progress_for_unknown_student_is_not_found() {
    let harness = harness().await;
    let (status, body) = get(&harness.app, "/api/v1/students/nobody/progress").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2001);

    let (status, body) = get(&harness.app, "/api/v1/students/s1/progress").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ava");
    assert_eq!(body["dollars"], 15);
}

#[tokio::test]
async fn failed_query_keeps_last_overview_marked_stale() {
    let harness = harness().await;
    let Ok(()) = harness.store.fail(
        Collection::Students,
        StoreError::PermissionDenied(Collection::Students),
    ) else {
        panic!("students feed exists");
    };
    let body = wait_for_overview(&harness.app, |o| o["stale"] == true).await;
    assert_eq!(body["data"]["totalStudents"], 4);
    assert!(body["last_error"].as_str().is_some());
}

#[tokio::test]
async fn websocket_pushes_overview_updates() {
    let harness = harness().await;
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind should succeed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has an address");
    };
    let app = harness.app.clone();
    tokio::spawn(async move { axum::serve(listener, app).await });

    let Ok((mut socket, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await
    else {
        panic!("ws handshake should succeed");
    };
    let subscribe = json!({
        "id": "sub-1",
        "type": "command",
        "timestamp": "2024-03-15T12:00:00Z",
        "payload": {"command": "subscribe", "topics": ["overview"]}
    });
    let Ok(()) = socket.send(Message::text(subscribe.to_string())).await else {
        panic!("send should succeed");
    };

    let response = next_json(&mut socket).await;
    assert_eq!(response["type"], "response");
    assert_eq!(response["id"], "sub-1");
    let initial = next_json(&mut socket).await;
    assert_eq!(initial["payload"]["event_type"], "overview_updated");
    assert_eq!(initial["payload"]["overview"]["totalStudents"], 4);

    let client = reqwest::Client::new();
    let Ok(reply) = client
        .post(format!("http://{addr}/api/v1/students/s2/rewards"))
        .json(&json!({"dollars": 3}))
        .send()
        .await
    else {
        panic!("reward request should succeed");
    };
    assert_eq!(reply.status(), reqwest::StatusCode::OK);

    let pushed = next_json(&mut socket).await;
    assert_eq!(pushed["type"], "event");
    assert_eq!(pushed["payload"]["overview"]["totalDollarsGiven"], 25);
}

async fn next_json<S>(socket: &mut S) -> Value
where
    S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let Ok(Some(Ok(message))) =
            tokio::time::timeout(Duration::from_secs(2), socket.next()).await
        else {
            panic!("expected a websocket message");
        };
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap_or(Value::Null);
        }
    }
}
