use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use skylane_api::{app, AppState};
use skylane_booking::{MemoryAllocator, MemoryLedger, MemoryQueries};
use skylane_catalog::MemoryCatalog;
use skylane_core::identity::{CredentialStore, MemoryAdminSessions, MemoryCredentialStore};
use skylane_store::RedisClient;

struct Harness {
    app: Router,
    ledger: Arc<MemoryLedger>,
}

/// Full router over the in-process engines, with the configured first-start
/// admin account already present. Redis is never reached: the rate limiter
/// only engages when a client socket address is attached.
async fn harness() -> Harness {
    let catalog = Arc::new(MemoryCatalog::new());
    let ledger = Arc::new(MemoryLedger::new());
    let directory = Arc::new(MemoryCredentialStore::new());
    directory
        .register("admin", "adminpassword", true)
        .await
        .unwrap();

    let state = AppState {
        catalog: catalog.clone(),
        ledger: ledger.clone(),
        allocator: Arc::new(MemoryAllocator::new(catalog.clone(), ledger.clone())),
        queries: Arc::new(MemoryQueries::new(
            catalog.clone(),
            ledger.clone(),
            directory.clone() as Arc<dyn CredentialStore>,
        )),
        directory,
        sessions: Arc::new(MemoryAdminSessions::new(3600)),
        redis: Arc::new(RedisClient::new("redis://127.0.0.1:6379").await.unwrap()),
    };

    Harness {
        app: app(state),
        ledger,
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn admin_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/admin/login",
        Some(json!({"username": "admin", "password": "adminpassword"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    parsed["admin_auth_token"].as_str().unwrap().to_string()
}

async fn add_flight(app: &Router, token: &str, number: &str, departure: &str, seats: i32) {
    let (status, _) = send(
        app,
        "POST",
        "/admin/flights/add",
        Some(json!({
            "flight_number": number,
            "departure_time": departure,
            "seat_count": seats,
        })),
        Some(token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn signup_then_login() {
    let h = harness().await;

    let (status, body) = send(
        &h.app,
        "POST",
        "/user/signup",
        Some(json!({"username": "frida", "password": "hunter2"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "User signed up successfully");

    let (status, body) = send(
        &h.app,
        "POST",
        "/user/login",
        Some(json!({"username": "frida", "password": "hunter2"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "User logged in successfully");

    // Failed login is still a 200, with the invalid text
    let (status, body) = send(
        &h.app,
        "POST",
        "/user/login",
        Some(json!({"username": "frida", "password": "wrong"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Invalid username or password");
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let h = harness().await;
    let body = json!({"username": "frida", "password": "hunter2"});

    let (status, _) = send(&h.app, "POST", "/user/signup", Some(body.clone()), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&h.app, "POST", "/user/signup", Some(body), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn search_is_exact_match_and_404_when_empty() {
    let h = harness().await;
    let token = admin_token(&h.app).await;

    let (status, body) = send(
        &h.app,
        "GET",
        "/flights/search?departure_time=2026-09-01%2009:00",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        parsed["message"],
        "No flights found for the given departure time."
    );

    add_flight(&h.app, &token, "SK300", "2026-09-01 09:00", 5).await;
    add_flight(&h.app, &token, "SK100", "2026-09-01 09:00", 2).await;
    add_flight(&h.app, &token, "SK200", "2026-09-01 21:00", 2).await;

    let (status, body) = send(
        &h.app,
        "GET",
        "/flights/search?departure_time=2026-09-01%2009:00",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    let flights = parsed["flights"].as_array().unwrap();
    assert_eq!(flights.len(), 2);
    assert_eq!(flights[0]["flight_number"], "SK100");
    assert_eq!(flights[0]["seat_count"], 2);
    assert_eq!(flights[1]["flight_number"], "SK300");
}

#[tokio::test]
async fn booking_consumes_seats_until_sold_out() {
    let h = harness().await;
    let token = admin_token(&h.app).await;
    add_flight(&h.app, &token, "AB123", "2026-09-01 09:00", 1).await;

    for name in ["frida", "malik"] {
        let (status, _) = send(
            &h.app,
            "POST",
            "/user/signup",
            Some(json!({"username": name, "password": "pw"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &h.app,
        "POST",
        "/flights/book",
        Some(json!({"flight_number": "AB123", "username": "frida"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Ticket booked successfully");

    // Sold out is a 200 with the no-seats text
    let (status, body) = send(
        &h.app,
        "POST",
        "/flights/book",
        Some(json!({"flight_number": "AB123", "username": "malik"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "No seats available");

    // Seat count visible via search is now zero
    let (_, body) = send(
        &h.app,
        "GET",
        "/flights/search?departure_time=2026-09-01%2009:00",
        None,
        None,
    )
    .await;
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["flights"][0]["seat_count"], 0);
}

#[tokio::test]
async fn booking_unknown_flight_or_rider_is_404() {
    let h = harness().await;

    let (status, _) = send(
        &h.app,
        "POST",
        "/flights/book",
        Some(json!({"flight_number": "SK999", "username": "nobody"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &h.app,
        "POST",
        "/user/signup",
        Some(json!({"username": "frida", "password": "pw"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &h.app,
        "POST",
        "/flights/book",
        Some(json!({"flight_number": "SK999", "username": "frida"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Flight not found");
}

#[tokio::test]
async fn rider_bookings_view() {
    let h = harness().await;
    let token = admin_token(&h.app).await;

    let (status, _) = send(&h.app, "GET", "/user/bookings", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&h.app, "GET", "/user/bookings?username=ghost", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(
        &h.app,
        "POST",
        "/user/signup",
        Some(json!({"username": "frida", "password": "pw"})),
        None,
    )
    .await;

    let (status, body) = send(&h.app, "GET", "/user/bookings?username=frida", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["message"], "No bookings found for this user.");

    add_flight(&h.app, &token, "SK100", "2026-09-01 09:00", 5).await;
    add_flight(&h.app, &token, "SK200", "2026-09-02 10:00", 5).await;
    for number in ["SK100", "SK200"] {
        let (status, _) = send(
            &h.app,
            "POST",
            "/flights/book",
            Some(json!({"flight_number": number, "username": "frida"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&h.app, "GET", "/user/bookings?username=frida", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    let views = parsed.as_array().unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0]["flight_number"], "SK100");
    assert_eq!(views[1]["departure_time"], "2026-09-02 10:00");

    // Removing a flight silently drops its booking from the view
    let (status, _) = send(
        &h.app,
        "POST",
        "/admin/flights/remove",
        Some(json!({"flight_number": "SK200"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&h.app, "GET", "/user/bookings?username=frida", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    let views = parsed.as_array().unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0]["flight_number"], "SK100");

    // All bookings dangling: distinguishable from having none at all
    let (status, _) = send(
        &h.app,
        "POST",
        "/admin/flights/remove",
        Some(json!({"flight_number": "SK100"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&h.app, "GET", "/user/bookings?username=frida", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["message"], "No valid bookings found for this user.");
}

#[tokio::test]
async fn admin_endpoints_require_valid_token() {
    let h = harness().await;
    let body = json!({
        "flight_number": "SK100",
        "departure_time": "2026-09-01 09:00",
        "seat_count": 5,
    });

    let (status, _) = send(&h.app, "POST", "/admin/flights/add", Some(body.clone()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A bearer token that was never issued does not validate
    let (status, _) = send(
        &h.app,
        "POST",
        "/admin/flights/add",
        Some(body.clone()),
        Some("deadbeefdeadbeefdeadbeefdeadbeef"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&h.app, "GET", "/admin/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Rider credentials do not make an admin
    send(
        &h.app,
        "POST",
        "/user/signup",
        Some(json!({"username": "frida", "password": "pw"})),
        None,
    )
    .await;
    let (status, _) = send(
        &h.app,
        "POST",
        "/admin/login",
        Some(json!({"username": "frida", "password": "pw"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &h.app,
        "POST",
        "/admin/login",
        Some(json!({"username": "admin", "password": "wrong"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_flight_management_validation() {
    let h = harness().await;
    let token = admin_token(&h.app).await;

    let (status, _) = send(
        &h.app,
        "POST",
        "/admin/flights/add",
        Some(json!({"flight_number": "SK100"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &h.app,
        "POST",
        "/admin/flights/add",
        Some(json!({
            "flight_number": "SK100",
            "departure_time": "2026-09-01 09:00",
            "seat_count": 0,
        })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    add_flight(&h.app, &token, "SK100", "2026-09-01 09:00", 5).await;

    let (status, body) = send(
        &h.app,
        "POST",
        "/admin/flights/add",
        Some(json!({
            "flight_number": "SK100",
            "departure_time": "2026-12-24 18:00",
            "seat_count": 9,
        })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["error"], "Flight with the same number already exists.");

    let (status, _) = send(
        &h.app,
        "POST",
        "/admin/flights/remove",
        Some(json!({})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &h.app,
        "POST",
        "/admin/flights/remove",
        Some(json!({"flight_number": "SK999"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &h.app,
        "POST",
        "/admin/flights/remove",
        Some(json!({"flight_number": "SK100"})),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_audit_view_joins_and_sentinels() {
    let h = harness().await;
    let token = admin_token(&h.app).await;
    add_flight(&h.app, &token, "SK100", "2026-09-01 09:00", 5).await;

    send(
        &h.app,
        "POST",
        "/user/signup",
        Some(json!({"username": "frida", "password": "pw"})),
        None,
    )
    .await;
    let (status, _) = send(
        &h.app,
        "POST",
        "/flights/book",
        Some(json!({"flight_number": "SK100", "username": "frida"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A ledger record whose rider identity is unknown: the audit view
    // substitutes the sentinel instead of failing.
    let flight_id = {
        let all = h.ledger.list_all();
        all[0].flight_id
    };
    h.ledger.append(flight_id, Uuid::new_v4());

    let (status, body) = send(&h.app, "GET", "/admin/bookings", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    let views = parsed.as_array().unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0]["flight_number"], "SK100");
    assert_eq!(views[0]["username"], "frida");
    assert_eq!(views[1]["username"], "User not found");
}
