//! Authentication and authorization behavior at the HTTP boundary:
//! denials are 403 with no state change, missing entities are 404, and
//! the two are never conflated.

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
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn seeded_order(app: &Router, client: Uuid, freelancer: Uuid) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/v1/services",
        Some(&bearer("freelancer", freelancer)),
        Some(json!({
            "title": "Voiceover",
            "description": "60 seconds, broadcast quality",
            "price": "90.00",
            "currency": "USD",
            "delivery_time_days": 3
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let service_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app,
        "POST",
        &format!("/v1/services/{service_id}/approve"),
        Some(&bearer("admin", Uuid::new_v4())),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        "POST",
        "/v1/orders",
        Some(&bearer("client", client)),
        Some(json!({ "service_id": service_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn missing_credentials_are_401() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/v1/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");

    let bad = format!("Bearer client:{}:wrong-secret", Uuid::new_v4());
    let (status, _) = send(&app, "GET", "/v1/orders", Some(&bad), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_probes_require_no_credentials() {
    let app = test_app();
    let (status, _) = send(&app, "GET", "/health/liveness", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

// ── Authorization vs existence ──────────────────────────────────────

#[tokio::test]
async fn missing_and_forbidden_are_distinct() {
    let app = test_app();
    let client = Uuid::new_v4();
    let freelancer = Uuid::new_v4();
    let order_id = seeded_order(&app, client, freelancer).await;

    // A random id is 404.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/v1/orders/{}", Uuid::new_v4()),
        Some(&bearer("client", client)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    // An existing order a stranger may not see is 403, not 404.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/v1/orders/{order_id}"),
        Some(&bearer("client", Uuid::new_v4())),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

// ── Authorization completeness: denied roles change nothing ─────────

#[tokio::test]
async fn unpermitted_roles_are_denied_without_state_change() {
    let app = test_app();
    let client = Uuid::new_v4();
    let freelancer = Uuid::new_v4();
    let order_id = seeded_order(&app, client, freelancer).await;

    // The client cannot accept their own order; that is the seller's call.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/accept"),
        Some(&bearer("client", client)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    // A stranger freelancer cannot accept it either.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/accept"),
        Some(&bearer("freelancer", Uuid::new_v4())),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An agent cannot cancel.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/cancel"),
        Some(&bearer("agent", Uuid::new_v4())),
        Some(json!({ "reason": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // After all the denials the order is still awaiting acceptance.
    let (_, body) = send(
        &app,
        "GET",
        &format!("/v1/orders/{order_id}"),
        Some(&bearer("client", client)),
        None,
    )
    .await;
    assert_eq!(body["status"], "PENDING_ACCEPTANCE");
    assert_eq!(body["transitions"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn client_accounts_cannot_post_services() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/v1/services",
        Some(&bearer("client", Uuid::new_v4())),
        Some(json!({
            "title": "Sneaky listing",
            "description": "client accounts cannot sell",
            "price": "10.00",
            "currency": "USD",
            "delivery_time_days": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    // An approved-seller client account can.
    let (status, _) = send(
        &app,
        "POST",
        "/v1/services",
        Some(&bearer("client_seller", Uuid::new_v4())),
        Some(json!({
            "title": "Hybrid listing",
            "description": "approved seller",
            "price": "10.00",
            "currency": "USD",
            "delivery_time_days": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn dispute_resolution_is_admin_only() {
    let app = test_app();
    let client = Uuid::new_v4();
    let freelancer = Uuid::new_v4();
    let order_id = seeded_order(&app, client, freelancer).await;

    // Drive to delivered, then dispute.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/accept"),
        Some(&bearer("freelancer", freelancer)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/deliver"),
        Some(&bearer("freelancer", freelancer)),
        Some(json!({ "type": "MESSAGE", "payload": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{order_id}/dispute"),
        Some(&bearer("client", client)),
        Some(json!({ "reason": "quality", "description": "details" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let dispute_id = body["dispute"]["id"].as_str().unwrap().to_string();

    // Neither party nor an agent may resolve.
    for auth in [
        bearer("client", client),
        bearer("freelancer", freelancer),
        bearer("agent", Uuid::new_v4()),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/v1/disputes/{dispute_id}/resolve"),
            Some(&auth),
            Some(json!({ "resolution": "done", "outcome": "COMPLETE_ORDER" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    // An agent may read and comment, though.
    let agent = Uuid::new_v4();
    let (status, _) = send(
        &app,
        "GET",
        &format!("/v1/disputes/{dispute_id}/comments"),
        Some(&bearer("agent", agent)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/disputes/{dispute_id}/comments"),
        Some(&bearer("agent", agent)),
        Some(json!({ "content": "ticket linked" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["role"], "AGENT");
}
