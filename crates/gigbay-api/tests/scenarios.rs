//! End-to-end walkthroughs of the engagement lifecycle, driven through
//! the HTTP surface against the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use gigbay_api::state::{AppConfig, AppState};
use gigbay_store::MemoryStore;

const SECRET: &str = "test-secret";

fn test_app() -> Router {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        AppConfig {
            port: 0,
            auth_secret: Some(SECRET.into()),
            offer_ttl_days: 14,
        },
    );
    gigbay_api::app(state)
}

fn bearer(role: &str, id: Uuid) -> String {
    format!("Bearer {role}:{id}:{SECRET}")
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    auth: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::AUTHORIZATION, auth);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder.body(Body::empty()).unwrap()
        }
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Let spawned effect-dispatch tasks drain before asserting on
/// notifications.
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Post a service as `freelancer`, approve it as admin, return its id.
async fn active_service(app: &Router, freelancer: Uuid) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/v1/services",
        &bearer("freelancer", freelancer),
        Some(json!({
            "title": "Logo design",
            "description": "Three concepts, vector deliverables",
            "price": "100.00",
            "currency": "USD",
            "delivery_time_days": 5,
            "revisions_included": 2
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app,
        "POST",
        &format!("/v1/services/{id}/approve"),
        &bearer("admin", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    id
}

/// Walk a fresh order to DELIVERED; returns (order_id, deliverable_id).
async fn delivered_order(
    app: &Router,
    client: Uuid,
    freelancer: Uuid,
    service_id: &str,
) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/v1/orders",
        &bearer("client", client),
        Some(json!({ "service_id": service_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["status"], "PENDING_ACCEPTANCE");

    let (status, body) = send(
        app,
        "POST",
        &format!("/v1/orders/{order_id}/accept"),
        &bearer("freelancer", freelancer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "IN_PROGRESS");

    let (status, body) = send(
        app,
        "POST",
        &format!("/v1/orders/{order_id}/deliver"),
        &bearer("freelancer", freelancer),
        Some(json!({ "type": "MESSAGE", "payload": "done, see attachment" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "DELIVERED");
    let deliverable_id = body["deliverables"][0]["id"].as_str().unwrap().to_string();
    (order_id, deliverable_id)
}

// ── Direct purchase: order → delivery → revision → completion ───────

#[tokio::test]
async fn order_walkthrough_to_completion() {
    let app = test_app();
    let client = Uuid::new_v4();
    let freelancer = Uuid::new_v4();
    let service_id = active_service(&app, freelancer).await;

    let (order_id, _) = delivered_order(&app, client, freelancer, &service_id).await;
    settle().await;

    // The delivery produced a notification for the client.
    let (_, notifications) =
        send(&app, "GET", "/v1/notifications", &bearer("client", client), None).await;
    let titles: Vec<_> = notifications
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap().to_string())
        .collect();
    assert!(titles.contains(&"Delivery submitted".to_string()), "{titles:?}");

    // Client requests a revision; the freelancer is told.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/revision"),
        &bearer("client", client),
        Some(json!({ "reason": "needs more contrast" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "REVISION_REQUESTED");
    settle().await;

    let (_, notifications) = send(
        &app,
        "GET",
        "/v1/notifications",
        &bearer("freelancer", freelancer),
        None,
    )
    .await;
    assert!(notifications
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["title"] == "Revision requested"));

    // Revised delivery returns the order to DELIVERED.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/deliver"),
        &bearer("freelancer", freelancer),
        Some(json!({ "type": "LINK", "payload": "https://example.com/v2", "is_revision": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "DELIVERED");
    let latest = body["deliverables"][1]["id"].as_str().unwrap().to_string();
    assert_eq!(body["deliverables"][1]["is_revision"], true);

    // Client accepts the revised deliverable.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/complete"),
        &bearer("client", client),
        Some(json!({ "deliverable_id": latest })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "COMPLETED");
    assert!(body["completed_at"].is_string());

    // Terminal: a later cancel is an invalid-state rejection.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/cancel"),
        &bearer("client", client),
        Some(json!({ "reason": "changed my mind" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_STATE");
    assert!(body["error"]["message"].as_str().unwrap().contains("COMPLETED"));

    // The completed order can be reviewed, once.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/review"),
        &bearer("client", client),
        Some(json!({ "rating": 5, "comment": "great work" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/review"),
        &bearer("client", client),
        Some(json!({ "rating": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

// ── Premature transitions ───────────────────────────────────────────

#[tokio::test]
async fn delivery_to_pending_order_is_rejected() {
    let app = test_app();
    let client = Uuid::new_v4();
    let freelancer = Uuid::new_v4();
    let service_id = active_service(&app, freelancer).await;

    let (_, body) = send(
        &app,
        "POST",
        "/v1/orders",
        &bearer("client", client),
        Some(json!({ "service_id": service_id })),
    )
    .await;
    let order_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/deliver"),
        &bearer("freelancer", freelancer),
        Some(json!({ "type": "MESSAGE", "payload": "eager" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_STATE");
}

#[tokio::test]
async fn repeated_accept_is_rejected_not_silent() {
    let app = test_app();
    let client = Uuid::new_v4();
    let freelancer = Uuid::new_v4();
    let service_id = active_service(&app, freelancer).await;

    let (_, body) = send(
        &app,
        "POST",
        "/v1/orders",
        &bearer("client", client),
        Some(json!({ "service_id": service_id })),
    )
    .await;
    let order_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/accept"),
        &bearer("freelancer", freelancer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/accept"),
        &bearer("freelancer", freelancer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_STATE");
}

// ── Offer flow ──────────────────────────────────────────────────────

#[tokio::test]
async fn offer_accept_creates_order_exactly_once() {
    let app = test_app();
    let client = Uuid::new_v4();
    let freelancer = Uuid::new_v4();
    let service_id = active_service(&app, freelancer).await;

    let (status, body) = send(
        &app,
        "POST",
        "/v1/offers",
        &bearer("freelancer", freelancer),
        Some(json!({
            "service_id": service_id,
            "client_id": client,
            "price": "80.00",
            "delivery_time_days": 4,
            "revisions_included": 1,
            "scope_of_work": "two logo concepts"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let offer_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["status"], "PENDING");
    settle().await;

    // The client was told an offer arrived.
    let (_, notifications) =
        send(&app, "GET", "/v1/notifications", &bearer("client", client), None).await;
    assert!(notifications
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["title"] == "New offer received"));

    // Accepting flips the offer and creates the order atomically.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/offers/{offer_id}/accept"),
        &bearer("client", client),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["offer"]["status"], "ACCEPTED");
    assert_eq!(body["order"]["status"], "IN_PROGRESS");
    assert_eq!(body["order"]["offer_id"], body["offer"]["id"]);
    assert_eq!(body["order"]["price"], "80.00");

    // A second accept fails; no second order appears.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/offers/{offer_id}/accept"),
        &bearer("client", client),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_STATE");

    let (_, orders) =
        send(&app, "GET", "/v1/orders", &bearer("client", client), None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_offer_creates_no_order() {
    let app = test_app();
    let client = Uuid::new_v4();
    let freelancer = Uuid::new_v4();
    let service_id = active_service(&app, freelancer).await;

    let (_, body) = send(
        &app,
        "POST",
        "/v1/offers",
        &bearer("freelancer", freelancer),
        Some(json!({
            "service_id": service_id,
            "client_id": client,
            "price": "80.00",
            "delivery_time_days": 4,
            "scope_of_work": "two logo concepts"
        })),
    )
    .await;
    let offer_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/offers/{offer_id}/reject"),
        &bearer("client", client),
        Some(json!({ "reason": "budget changed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "REJECTED");
    assert_eq!(body["rejection_reason"], "budget changed");

    let (_, orders) =
        send(&app, "GET", "/v1/orders", &bearer("client", client), None).await;
    assert!(orders.as_array().unwrap().is_empty());

    // Terminal: accepting the rejected offer fails.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/offers/{offer_id}/accept"),
        &bearer("client", client),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// ── Dispute branch ──────────────────────────────────────────────────

#[tokio::test]
async fn dispute_branch_blocks_and_releases_the_order() {
    let app = test_app();
    let client = Uuid::new_v4();
    let freelancer = Uuid::new_v4();
    let service_id = active_service(&app, freelancer).await;
    let (order_id, deliverable_id) =
        delivered_order(&app, client, freelancer, &service_id).await;

    // Client opens a dispute on the delivered order.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/dispute"),
        &bearer("client", client),
        Some(json!({ "reason": "quality", "description": "not what was agreed" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["dispute"]["status"], "OPEN");
    assert_eq!(body["order"]["status"], "DISPUTED");
    let dispute_id = body["dispute"]["id"].as_str().unwrap().to_string();

    // A second dispute on the same order is a conflict.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/dispute"),
        &bearer("client", client),
        Some(json!({ "reason": "still quality", "description": "again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    // The disputed order blocks revision and completion.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/revision"),
        &bearer("client", client),
        Some(json!({ "reason": "blocked" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/complete"),
        &bearer("client", client),
        Some(json!({ "deliverable_id": deliverable_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The freelancer can comment while the dispute is active.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/disputes/{dispute_id}/comments"),
        &bearer("freelancer", freelancer),
        Some(json!({ "content": "v2 matches the brief" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["role"], "FREELANCER");

    // Admin review, then resolution reopening the work.
    let admin = Uuid::new_v4();
    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/disputes/{dispute_id}/review"),
        &bearer("admin", admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/disputes/{dispute_id}/resolve"),
        &bearer("admin", admin),
        Some(json!({ "resolution": "seller gets another attempt", "outcome": "REOPEN_WORK" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["dispute"]["status"], "RESOLVED");
    assert_eq!(body["order"]["status"], "IN_PROGRESS");

    // The frozen thread rejects further comments.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/disputes/{dispute_id}/comments"),
        &bearer("freelancer", freelancer),
        Some(json!({ "content": "one more thing" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

#[tokio::test]
async fn withdrawn_dispute_returns_order_to_delivered() {
    let app = test_app();
    let client = Uuid::new_v4();
    let freelancer = Uuid::new_v4();
    let service_id = active_service(&app, freelancer).await;
    let (order_id, deliverable_id) =
        delivered_order(&app, client, freelancer, &service_id).await;

    let (_, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/dispute"),
        &bearer("client", client),
        Some(json!({ "reason": "quality", "description": "details" })),
    )
    .await;
    let dispute_id = body["dispute"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/disputes/{dispute_id}/withdraw"),
        &bearer("client", client),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["dispute"]["status"], "CLOSED");
    assert_eq!(body["order"]["status"], "DELIVERED");

    // The released order can complete normally.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/complete"),
        &bearer("client", client),
        Some(json!({ "deliverable_id": deliverable_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "COMPLETED");
}
