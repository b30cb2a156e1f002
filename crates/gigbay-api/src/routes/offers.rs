//! Offer endpoints.
//!
//! - `POST /v1/offers` — seller proposes terms to a client
//! - `GET /v1/offers` — offers where the caller is a party
//! - `GET /v1/offers/:id` — one offer
//! - `POST /v1/offers/:id/accept` — client accepts; returns offer + order
//! - `POST /v1/offers/:id/reject` — client rejects with a reason

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use gigbay_core::{ConversationId, OfferId, Price, ServiceId, UserId};
use gigbay_engine::{CreateOffer, Offer, Order};

use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{Validate, ValidatedJson};
use crate::state::AppState;
use crate::workflow::OfferManager;

/// Request to create an offer against the caller's service.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOfferRequest {
    pub service_id: Uuid,
    /// The client the offer is addressed to.
    pub client_id: Uuid,
    pub conversation_id: Option<Uuid>,
    /// Decimal amount, e.g. `"120.00"`.
    pub price: String,
    pub delivery_time_days: u32,
    #[serde(default)]
    pub revisions_included: u32,
    pub scope_of_work: String,
    pub cancellation_policy: Option<String>,
}

impl Validate for CreateOfferRequest {
    fn validate(&self) -> Result<(), String> {
        if self.scope_of_work.trim().is_empty() {
            return Err("scope_of_work must not be empty".into());
        }
        if Price::parse(&self.price).is_err() {
            return Err(format!("price must be a positive decimal, got {:?}", self.price));
        }
        Ok(())
    }
}

/// Request carrying a mandatory reason.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectOfferRequest {
    pub reason: String,
}

impl Validate for RejectOfferRequest {
    fn validate(&self) -> Result<(), String> {
        if self.reason.trim().is_empty() {
            return Err("reason must not be empty".into());
        }
        Ok(())
    }
}

/// Response to an accepted offer: the offer and the order it created.
#[derive(Debug, Serialize, ToSchema)]
pub struct AcceptOfferResponse {
    pub offer: Offer,
    pub order: Order,
}

/// Build the offers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/offers", get(list_offers).post(create_offer))
        .route("/v1/offers/:id", get(get_offer))
        .route("/v1/offers/:id/accept", post(accept_offer))
        .route("/v1/offers/:id/reject", post(reject_offer))
}

/// POST /v1/offers — Propose terms to a client.
#[utoipa::path(
    post,
    path = "/v1/offers",
    request_body = CreateOfferRequest,
    responses(
        (status = 201, description = "Offer created", body = Offer),
        (status = 403, description = "Not the service's seller", body = crate::error::ErrorBody),
        (status = 404, description = "Service not found", body = crate::error::ErrorBody),
        (status = 409, description = "Service not active", body = crate::error::ErrorBody),
    ),
    tag = "offers"
)]
pub(crate) async fn create_offer(
    State(state): State<AppState>,
    Caller(actor): Caller,
    ValidatedJson(req): ValidatedJson<CreateOfferRequest>,
) -> Result<(StatusCode, Json<Offer>), AppError> {
    let price = Price::parse(&req.price)?;
    let (offer, effects) = OfferManager::new(state.store.clone())
        .create(
            &actor,
            ServiceId(req.service_id),
            CreateOffer {
                client_id: UserId(req.client_id),
                conversation_id: req.conversation_id.map(ConversationId),
                price,
                delivery_time_days: req.delivery_time_days,
                revisions_included: req.revisions_included,
                scope_of_work: req.scope_of_work,
                cancellation_policy: req.cancellation_policy,
            },
        )
        .await?;
    state.dispatcher.dispatch(effects);
    Ok((StatusCode::CREATED, Json(offer)))
}

/// GET /v1/offers — Offers where the caller is a party.
#[utoipa::path(
    get,
    path = "/v1/offers",
    responses((status = 200, description = "The caller's offers", body = Vec<Offer>)),
    tag = "offers"
)]
pub(crate) async fn list_offers(
    State(state): State<AppState>,
    Caller(actor): Caller,
) -> Result<Json<Vec<Offer>>, AppError> {
    let offers = OfferManager::new(state.store.clone()).list_for(&actor).await?;
    Ok(Json(offers))
}

/// GET /v1/offers/:id — One offer.
#[utoipa::path(
    get,
    path = "/v1/offers/{id}",
    params(("id" = Uuid, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Offer found", body = Offer),
        (status = 403, description = "Not a party to the offer", body = crate::error::ErrorBody),
        (status = 404, description = "Offer not found", body = crate::error::ErrorBody),
    ),
    tag = "offers"
)]
pub(crate) async fn get_offer(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Offer>, AppError> {
    let offer = OfferManager::new(state.store.clone())
        .get(&actor, OfferId(id))
        .await?;
    Ok(Json(offer))
}

/// POST /v1/offers/:id/accept — Accept; the order is created atomically.
#[utoipa::path(
    post,
    path = "/v1/offers/{id}/accept",
    params(("id" = Uuid, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Offer accepted, order created", body = AcceptOfferResponse),
        (status = 403, description = "Not the offer's client", body = crate::error::ErrorBody),
        (status = 404, description = "Offer not found", body = crate::error::ErrorBody),
        (status = 409, description = "Offer not pending, or lost a concurrent accept", body = crate::error::ErrorBody),
    ),
    tag = "offers"
)]
pub(crate) async fn accept_offer(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<AcceptOfferResponse>, AppError> {
    let (offer, order, effects) = OfferManager::new(state.store.clone())
        .accept(&actor, OfferId(id))
        .await?;
    state.dispatcher.dispatch(effects);
    Ok(Json(AcceptOfferResponse { offer, order }))
}

/// POST /v1/offers/:id/reject — Reject with a reason.
#[utoipa::path(
    post,
    path = "/v1/offers/{id}/reject",
    params(("id" = Uuid, Path, description = "Offer ID")),
    request_body = RejectOfferRequest,
    responses(
        (status = 200, description = "Offer rejected", body = Offer),
        (status = 403, description = "Not the offer's client", body = crate::error::ErrorBody),
        (status = 404, description = "Offer not found", body = crate::error::ErrorBody),
        (status = 409, description = "Offer not pending", body = crate::error::ErrorBody),
    ),
    tag = "offers"
)]
pub(crate) async fn reject_offer(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<RejectOfferRequest>,
) -> Result<Json<Offer>, AppError> {
    let (offer, effects) = OfferManager::new(state.store.clone())
        .reject(&actor, OfferId(id), &req.reason)
        .await?;
    state.dispatcher.dispatch(effects);
    Ok(Json(offer))
}
