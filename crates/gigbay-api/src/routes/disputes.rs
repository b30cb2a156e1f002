//! Dispute endpoints. Opening a dispute lives under
//! `POST /v1/orders/:id/dispute` — a dispute is born from its order.
//!
//! - `GET /v1/disputes/:id` — one dispute
//! - `GET /v1/disputes/:id/comments` — the thread, oldest first
//! - `POST /v1/disputes/:id/comments` — append a comment
//! - `POST /v1/disputes/:id/review` — admin takes the case up
//! - `POST /v1/disputes/:id/resolve` — admin resolution with outcome
//! - `POST /v1/disputes/:id/withdraw` — client withdraws

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use gigbay_core::DisputeId;
use gigbay_engine::{Dispute, DisputeComment, DisputeOutcome, Order};

use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{Validate, ValidatedJson};
use crate::state::AppState;
use crate::workflow::DisputeService;

// ── Request/response DTOs ───────────────────────────────────────────

/// Request to append a dispute comment.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCommentRequest {
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl Validate for AddCommentRequest {
    fn validate(&self) -> Result<(), String> {
        if self.content.trim().is_empty() {
            return Err("content must not be empty".into());
        }
        Ok(())
    }
}

/// Request to resolve a dispute.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveDisputeRequest {
    /// The written resolution both parties will see.
    pub resolution: String,
    /// What happens to the order.
    pub outcome: DisputeOutcome,
}

impl Validate for ResolveDisputeRequest {
    fn validate(&self) -> Result<(), String> {
        if self.resolution.trim().is_empty() {
            return Err("resolution must not be empty".into());
        }
        Ok(())
    }
}

/// Response to a settlement: the dispute and the order it released.
#[derive(Debug, Serialize, ToSchema)]
pub struct DisputeSettlementResponse {
    pub dispute: Dispute,
    pub order: Order,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the disputes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/disputes/:id", get(get_dispute))
        .route(
            "/v1/disputes/:id/comments",
            get(list_comments).post(add_comment),
        )
        .route("/v1/disputes/:id/review", post(begin_review))
        .route("/v1/disputes/:id/resolve", post(resolve_dispute))
        .route("/v1/disputes/:id/withdraw", post(withdraw_dispute))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/disputes/:id — One dispute.
#[utoipa::path(
    get,
    path = "/v1/disputes/{id}",
    params(("id" = Uuid, Path, description = "Dispute ID")),
    responses(
        (status = 200, description = "Dispute found", body = Dispute),
        (status = 403, description = "Not a party or staff", body = crate::error::ErrorBody),
        (status = 404, description = "Dispute not found", body = crate::error::ErrorBody),
    ),
    tag = "disputes"
)]
pub(crate) async fn get_dispute(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Dispute>, AppError> {
    let dispute = DisputeService::new(state.store.clone())
        .get(&actor, DisputeId(id))
        .await?;
    Ok(Json(dispute))
}

/// GET /v1/disputes/:id/comments — The thread, oldest first.
#[utoipa::path(
    get,
    path = "/v1/disputes/{id}/comments",
    params(("id" = Uuid, Path, description = "Dispute ID")),
    responses(
        (status = 200, description = "Comment thread", body = Vec<DisputeComment>),
        (status = 403, description = "Not a party or staff", body = crate::error::ErrorBody),
        (status = 404, description = "Dispute not found", body = crate::error::ErrorBody),
    ),
    tag = "disputes"
)]
pub(crate) async fn list_comments(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DisputeComment>>, AppError> {
    let comments = DisputeService::new(state.store.clone())
        .comments(&actor, DisputeId(id))
        .await?;
    Ok(Json(comments))
}

/// POST /v1/disputes/:id/comments — Append a comment.
#[utoipa::path(
    post,
    path = "/v1/disputes/{id}/comments",
    params(("id" = Uuid, Path, description = "Dispute ID")),
    request_body = AddCommentRequest,
    responses(
        (status = 201, description = "Comment appended", body = DisputeComment),
        (status = 403, description = "Not a party or staff", body = crate::error::ErrorBody),
        (status = 409, description = "Dispute resolved or closed", body = crate::error::ErrorBody),
    ),
    tag = "disputes"
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AddCommentRequest>,
) -> Result<(StatusCode, Json<DisputeComment>), AppError> {
    let (comment, effects) = DisputeService::new(state.store.clone())
        .add_comment(&actor, DisputeId(id), &req.content, req.attachments)
        .await?;
    state.dispatcher.dispatch(effects);
    Ok((StatusCode::CREATED, Json(comment)))
}

/// POST /v1/disputes/:id/review — Admin takes the case up.
#[utoipa::path(
    post,
    path = "/v1/disputes/{id}/review",
    params(("id" = Uuid, Path, description = "Dispute ID")),
    responses(
        (status = 200, description = "Dispute in review", body = Dispute),
        (status = 403, description = "Admin only", body = crate::error::ErrorBody),
        (status = 409, description = "Dispute not open", body = crate::error::ErrorBody),
    ),
    tag = "disputes"
)]
pub(crate) async fn begin_review(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Dispute>, AppError> {
    let (dispute, effects) = DisputeService::new(state.store.clone())
        .begin_review(&actor, DisputeId(id))
        .await?;
    state.dispatcher.dispatch(effects);
    Ok(Json(dispute))
}

/// POST /v1/disputes/:id/resolve — Admin resolution.
#[utoipa::path(
    post,
    path = "/v1/disputes/{id}/resolve",
    params(("id" = Uuid, Path, description = "Dispute ID")),
    request_body = ResolveDisputeRequest,
    responses(
        (status = 200, description = "Dispute resolved, order settled", body = DisputeSettlementResponse),
        (status = 403, description = "Admin only", body = crate::error::ErrorBody),
        (status = 409, description = "Dispute already settled", body = crate::error::ErrorBody),
    ),
    tag = "disputes"
)]
pub(crate) async fn resolve_dispute(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ResolveDisputeRequest>,
) -> Result<Json<DisputeSettlementResponse>, AppError> {
    let (dispute, order, effects) = DisputeService::new(state.store.clone())
        .resolve(&actor, DisputeId(id), &req.resolution, req.outcome)
        .await?;
    state.dispatcher.dispatch(effects);
    Ok(Json(DisputeSettlementResponse { dispute, order }))
}

/// POST /v1/disputes/:id/withdraw — Client withdraws the dispute.
#[utoipa::path(
    post,
    path = "/v1/disputes/{id}/withdraw",
    params(("id" = Uuid, Path, description = "Dispute ID")),
    responses(
        (status = 200, description = "Dispute closed, order back to delivered", body = DisputeSettlementResponse),
        (status = 403, description = "Not the dispute's client", body = crate::error::ErrorBody),
        (status = 409, description = "Dispute already settled", body = crate::error::ErrorBody),
    ),
    tag = "disputes"
)]
pub(crate) async fn withdraw_dispute(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<DisputeSettlementResponse>, AppError> {
    let (dispute, order, effects) = DisputeService::new(state.store.clone())
        .withdraw(&actor, DisputeId(id))
        .await?;
    state.dispatcher.dispatch(effects);
    Ok(Json(DisputeSettlementResponse { dispute, order }))
}
