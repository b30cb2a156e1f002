//! Order lifecycle endpoints.
//!
//! - `POST /v1/orders` — direct purchase of an active service
//! - `GET /v1/orders` — orders where the caller is a party
//! - `GET /v1/orders/:id` — one order
//! - `POST /v1/orders/:id/accept` — seller takes the work on
//! - `POST /v1/orders/:id/reject` — seller declines, with a reason
//! - `POST /v1/orders/:id/cancel` — either party backs out pre-delivery
//! - `POST /v1/orders/:id/deliver` — seller submits work
//! - `POST /v1/orders/:id/revision` — client requests another pass
//! - `POST /v1/orders/:id/complete` — client accepts a deliverable
//! - `POST /v1/orders/:id/dispute` — client escalates a delivered order
//! - `POST /v1/orders/:id/review`, `GET /v1/orders/:id/review`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use gigbay_core::{ConversationId, DeliverableId, OrderId, ServiceId};
use gigbay_engine::{
    DeliverableType, Dispute, NewDelivery, OpenDispute, Order, Review,
};

use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{Validate, ValidatedJson};
use crate::state::AppState;
use crate::workflow::{DisputeService, OrderLifecycle};

// ── Request/response DTOs ───────────────────────────────────────────

/// Request for a direct service purchase.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub service_id: Uuid,
    pub conversation_id: Option<Uuid>,
}

impl Validate for CreateOrderRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Request carrying a mandatory reason (reject, cancel, revision).
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReasonRequest {
    pub reason: String,
}

impl Validate for ReasonRequest {
    fn validate(&self) -> Result<(), String> {
        if self.reason.trim().is_empty() {
            return Err("reason must not be empty".into());
        }
        Ok(())
    }
}

/// Request to submit a delivery.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeliveryRequest {
    #[serde(rename = "type")]
    pub kind: DeliverableType,
    pub payload: String,
    #[serde(default)]
    pub is_revision: bool,
}

impl Validate for DeliveryRequest {
    fn validate(&self) -> Result<(), String> {
        if self.payload.trim().is_empty() {
            return Err("payload must not be empty".into());
        }
        Ok(())
    }
}

/// Request to accept a specific deliverable.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteRequest {
    pub deliverable_id: Uuid,
}

impl Validate for CompleteRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Request to open a dispute against a delivered order.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenDisputeRequest {
    pub reason: String,
    pub description: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl Validate for OpenDisputeRequest {
    fn validate(&self) -> Result<(), String> {
        if self.reason.trim().is_empty() {
            return Err("reason must not be empty".into());
        }
        if self.description.trim().is_empty() {
            return Err("description must not be empty".into());
        }
        Ok(())
    }
}

/// Request to review a completed order.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    /// 1 (worst) to 5 (best).
    pub rating: u8,
    pub comment: Option<String>,
}

impl Validate for ReviewRequest {
    fn validate(&self) -> Result<(), String> {
        if !(1..=5).contains(&self.rating) {
            return Err(format!("rating must be between 1 and 5, got {}", self.rating));
        }
        Ok(())
    }
}

/// Response to opening a dispute: the dispute and the updated order.
#[derive(Debug, Serialize, ToSchema)]
pub struct OpenDisputeResponse {
    pub dispute: Dispute,
    pub order: Order,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", get(list_orders).post(create_order))
        .route("/v1/orders/:id", get(get_order))
        .route("/v1/orders/:id/accept", post(accept_order))
        .route("/v1/orders/:id/reject", post(reject_order))
        .route("/v1/orders/:id/cancel", post(cancel_order))
        .route("/v1/orders/:id/deliver", post(submit_delivery))
        .route("/v1/orders/:id/revision", post(request_revision))
        .route("/v1/orders/:id/complete", post(accept_delivery))
        .route("/v1/orders/:id/dispute", post(open_dispute))
        .route("/v1/orders/:id/review", get(get_review).post(leave_review))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/orders — Purchase a service directly.
#[utoipa::path(
    post,
    path = "/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created, awaiting seller acceptance", body = Order),
        (status = 404, description = "Service not found", body = crate::error::ErrorBody),
        (status = 409, description = "Service not active", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn create_order(
    State(state): State<AppState>,
    Caller(actor): Caller,
    ValidatedJson(req): ValidatedJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let (order, effects) = OrderLifecycle::new(state.store.clone())
        .create(
            &actor,
            ServiceId(req.service_id),
            req.conversation_id.map(ConversationId),
        )
        .await?;
    state.dispatcher.dispatch(effects);
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /v1/orders — Orders where the caller is a party.
#[utoipa::path(
    get,
    path = "/v1/orders",
    responses((status = 200, description = "The caller's orders", body = Vec<Order>)),
    tag = "orders"
)]
pub(crate) async fn list_orders(
    State(state): State<AppState>,
    Caller(actor): Caller,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = OrderLifecycle::new(state.store.clone())
        .list_for(&actor)
        .await?;
    Ok(Json(orders))
}

/// GET /v1/orders/:id — One order.
#[utoipa::path(
    get,
    path = "/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 403, description = "Not a party to the order", body = crate::error::ErrorBody),
        (status = 404, description = "Order not found", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn get_order(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = OrderLifecycle::new(state.store.clone())
        .get(&actor, OrderId(id))
        .await?;
    Ok(Json(order))
}

/// POST /v1/orders/:id/accept — Seller takes the work on.
#[utoipa::path(
    post,
    path = "/v1/orders/{id}/accept",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order in progress", body = Order),
        (status = 403, description = "Not the order's freelancer", body = crate::error::ErrorBody),
        (status = 409, description = "Order not awaiting acceptance", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn accept_order(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let (order, effects) = OrderLifecycle::new(state.store.clone())
        .accept(&actor, OrderId(id))
        .await?;
    state.dispatcher.dispatch(effects);
    Ok(Json(order))
}

/// POST /v1/orders/:id/reject — Seller declines the work.
#[utoipa::path(
    post,
    path = "/v1/orders/{id}/reject",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = ReasonRequest,
    responses(
        (status = 200, description = "Order cancelled with rejection reason", body = Order),
        (status = 403, description = "Not the order's freelancer", body = crate::error::ErrorBody),
        (status = 409, description = "Order not awaiting acceptance", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn reject_order(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ReasonRequest>,
) -> Result<Json<Order>, AppError> {
    let (order, effects) = OrderLifecycle::new(state.store.clone())
        .reject(&actor, OrderId(id), &req.reason)
        .await?;
    state.dispatcher.dispatch(effects);
    Ok(Json(order))
}

/// POST /v1/orders/:id/cancel — Either party backs out.
#[utoipa::path(
    post,
    path = "/v1/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = ReasonRequest,
    responses(
        (status = 200, description = "Order cancelled", body = Order),
        (status = 403, description = "Not a party to the order", body = crate::error::ErrorBody),
        (status = 409, description = "Order past the point of cancellation", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn cancel_order(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ReasonRequest>,
) -> Result<Json<Order>, AppError> {
    let (order, effects) = OrderLifecycle::new(state.store.clone())
        .cancel(&actor, OrderId(id), &req.reason)
        .await?;
    state.dispatcher.dispatch(effects);
    Ok(Json(order))
}

/// POST /v1/orders/:id/deliver — Seller submits work.
#[utoipa::path(
    post,
    path = "/v1/orders/{id}/deliver",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = DeliveryRequest,
    responses(
        (status = 200, description = "Delivery submitted", body = Order),
        (status = 403, description = "Not the order's freelancer", body = crate::error::ErrorBody),
        (status = 409, description = "Order not in progress", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid payload for the deliverable type", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn submit_delivery(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<DeliveryRequest>,
) -> Result<Json<Order>, AppError> {
    let (order, effects) = OrderLifecycle::new(state.store.clone())
        .submit_delivery(
            &actor,
            OrderId(id),
            NewDelivery {
                kind: req.kind,
                payload: req.payload,
                is_revision: req.is_revision,
            },
        )
        .await?;
    state.dispatcher.dispatch(effects);
    Ok(Json(order))
}

/// POST /v1/orders/:id/revision — Client requests another pass.
#[utoipa::path(
    post,
    path = "/v1/orders/{id}/revision",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = ReasonRequest,
    responses(
        (status = 200, description = "Revision requested", body = Order),
        (status = 403, description = "Not the order's client", body = crate::error::ErrorBody),
        (status = 409, description = "Order not delivered", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn request_revision(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ReasonRequest>,
) -> Result<Json<Order>, AppError> {
    let (order, effects) = OrderLifecycle::new(state.store.clone())
        .request_revision(&actor, OrderId(id), &req.reason)
        .await?;
    state.dispatcher.dispatch(effects);
    Ok(Json(order))
}

/// POST /v1/orders/:id/complete — Client accepts a deliverable.
#[utoipa::path(
    post,
    path = "/v1/orders/{id}/complete",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = CompleteRequest,
    responses(
        (status = 200, description = "Order completed", body = Order),
        (status = 403, description = "Not the order's client", body = crate::error::ErrorBody),
        (status = 404, description = "Deliverable not part of this order", body = crate::error::ErrorBody),
        (status = 409, description = "Order not delivered", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn accept_delivery(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CompleteRequest>,
) -> Result<Json<Order>, AppError> {
    let (order, effects) = OrderLifecycle::new(state.store.clone())
        .accept_delivery(&actor, OrderId(id), DeliverableId(req.deliverable_id))
        .await?;
    state.dispatcher.dispatch(effects);
    Ok(Json(order))
}

/// POST /v1/orders/:id/dispute — Client escalates a delivered order.
#[utoipa::path(
    post,
    path = "/v1/orders/{id}/dispute",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = OpenDisputeRequest,
    responses(
        (status = 201, description = "Dispute opened, order disputed", body = OpenDisputeResponse),
        (status = 403, description = "Not the order's client", body = crate::error::ErrorBody),
        (status = 409, description = "Order not delivered, or a dispute is already active", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn open_dispute(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<OpenDisputeRequest>,
) -> Result<(StatusCode, Json<OpenDisputeResponse>), AppError> {
    let (dispute, order, effects) = DisputeService::new(state.store.clone())
        .open(
            &actor,
            OrderId(id),
            OpenDispute {
                reason: req.reason,
                description: req.description,
                attachments: req.attachments,
            },
        )
        .await?;
    state.dispatcher.dispatch(effects);
    Ok((StatusCode::CREATED, Json(OpenDisputeResponse { dispute, order })))
}

/// POST /v1/orders/:id/review — Client reviews a completed order.
#[utoipa::path(
    post,
    path = "/v1/orders/{id}/review",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review recorded", body = Review),
        (status = 403, description = "Not the order's client", body = crate::error::ErrorBody),
        (status = 409, description = "Order not completed, or already reviewed", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn leave_review(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let (review, effects) = OrderLifecycle::new(state.store.clone())
        .leave_review(&actor, OrderId(id), req.rating, req.comment)
        .await?;
    state.dispatcher.dispatch(effects);
    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /v1/orders/:id/review — The order's review.
#[utoipa::path(
    get,
    path = "/v1/orders/{id}/review",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Review found", body = Review),
        (status = 404, description = "Order or review not found", body = crate::error::ErrorBody),
    ),
    tag = "orders"
)]
pub(crate) async fn get_review(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Review>, AppError> {
    let review = OrderLifecycle::new(state.store.clone())
        .get_review(&actor, OrderId(id))
        .await?;
    Ok(Json(review))
}
