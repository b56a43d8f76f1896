use std::sync::Arc;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use seatline_api::{app, AppState};
use seatline_booking::BookingOrchestrator;
use seatline_seating::{SeatAllocator, SectionLayout};
use seatline_store::InMemoryBookingStore;

fn test_app(layout: Vec<SectionLayout>) -> Router {
    let allocator = Arc::new(SeatAllocator::new(layout).unwrap());
    let store = Arc::new(InMemoryBookingStore::new());
    app(AppState {
        bookings: Arc::new(BookingOrchestrator::new(allocator, store)),
    })
}

fn ann() -> Value {
    json!({ "first_name": "Ann", "last_name": "Lee", "email": "ann@x.com" })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_booking_lifecycle_over_http() {
    let app = test_app(SectionLayout::default_layout());

    let create = json!({ "from": "London", "to": "France", "price": 20, "user": ann() });
    let (status, created) = send(&app, "POST", "/v1/bookings", Some(create.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["from"], "London");
    assert_eq!(created["to"], "France");
    assert_eq!(created["price"], 20);
    assert!(created["seat"].as_u64().unwrap() < 20);
    let section = created["section"].as_str().unwrap().to_string();

    // Repeating the request returns the same ticket
    let (status, again) = send(&app, "POST", "/v1/bookings", Some(create)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["id"], created["id"]);

    let (status, fetched) = send(&app, "POST", "/v1/bookings/lookup", Some(json!({ "user": ann() }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["user"]["email"], "ann@x.com");

    let uri = format!("/v1/sections/{}/bookings", section);
    let (status, listed) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["bookings"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "POST", "/v1/bookings/cancel", Some(json!({ "user": ann() }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(&app, "GET", &uri, None).await;
    assert!(listed["bookings"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, "POST", "/v1/bookings/lookup", Some(json!({ "user": ann() }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("ann@x.com"));
}

#[tokio::test]
async fn test_invalid_create_is_bad_request() {
    let app = test_app(SectionLayout::default_layout());

    let create = json!({ "from": "London", "to": "France", "price": 0, "user": ann() });
    let (status, body) = send(&app, "POST", "/v1/bookings", Some(create)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_modify_seat_over_http() {
    let app = test_app(vec![SectionLayout::new("A", 2)]);

    let bob = json!({ "first_name": "Bob", "last_name": "Ray", "email": "bob@x.com" });
    let (_, bob_booking) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({ "from": "London", "to": "France", "price": 20, "user": bob.clone() })),
    )
    .await;
    let (_, ann_booking) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({ "from": "London", "to": "France", "price": 20, "user": ann() })),
    )
    .await;

    // Both seats of the only section are taken, so Ann cannot move onto Bob's seat
    let (status, _) = send(
        &app,
        "POST",
        "/v1/bookings/seat",
        Some(json!({ "user": ann(), "section": "A", "seat": bob_booking["seat"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/v1/bookings/seat",
        Some(json!({ "user": ann(), "section": "A", "seat": ann_booking["seat"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A third passenger finds the train full
    let (status, body) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(json!({
            "from": "London",
            "to": "France",
            "price": 20,
            "user": { "first_name": "Cy", "last_name": "Oh", "email": "cy@x.com" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal Server Error");

    // After Bob cancels, Ann can take his seat
    send(&app, "POST", "/v1/bookings/cancel", Some(json!({ "user": bob }))).await;
    let (status, moved) = send(
        &app,
        "POST",
        "/v1/bookings/seat",
        Some(json!({ "user": ann(), "section": "A", "seat": bob_booking["seat"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["id"], ann_booking["id"]);
    assert_eq!(moved["seat"], bob_booking["seat"]);

    let (_, seating) = send(&app, "GET", "/v1/seating", None).await;
    assert_eq!(seating[0]["section"], "A");
    assert_eq!(seating[0]["occupied"], 1);
}

#[tokio::test]
async fn test_health() {
    let app = test_app(SectionLayout::default_layout());
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
