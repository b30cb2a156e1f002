//! Service-listing endpoints.
//!
//! - `POST /v1/services` — post a listing (seller)
//! - `GET /v1/services` — browse listings
//! - `GET /v1/services/:id` — one listing
//! - `POST /v1/services/:id/approve` — approve (admin)
//! - `POST /v1/services/:id/pause` — pause (owner)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use gigbay_core::{Price, ServiceId};
use gigbay_engine::ServiceListing;

use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{Validate, ValidatedJson};
use crate::state::AppState;
use crate::workflow::catalog::{PostService, ServiceCatalog};

/// Request to post a service listing.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub title: String,
    pub description: String,
    /// Decimal amount, e.g. `"150.00"`.
    pub price: String,
    pub currency: String,
    pub delivery_time_days: u32,
    #[serde(default)]
    pub revisions_included: u32,
}

impl Validate for CreateServiceRequest {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".into());
        }
        if Price::parse(&self.price).is_err() {
            return Err(format!("price must be a positive decimal, got {:?}", self.price));
        }
        Ok(())
    }
}

/// Build the services router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/services", get(list_services).post(create_service))
        .route("/v1/services/:id", get(get_service))
        .route("/v1/services/:id/approve", post(approve_service))
        .route("/v1/services/:id/pause", post(pause_service))
}

/// POST /v1/services — Post a listing.
#[utoipa::path(
    post,
    path = "/v1/services",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Listing posted, pending approval", body = ServiceListing),
        (status = 403, description = "Not seller-capable", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "services"
)]
pub(crate) async fn create_service(
    State(state): State<AppState>,
    Caller(actor): Caller,
    ValidatedJson(req): ValidatedJson<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ServiceListing>), AppError> {
    let price = Price::parse(&req.price)?;
    let service = ServiceCatalog::new(state.store.clone())
        .create(
            &actor,
            PostService {
                title: req.title,
                description: req.description,
                price,
                currency: req.currency,
                delivery_time_days: req.delivery_time_days,
                revisions_included: req.revisions_included,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// GET /v1/services — Browse listings.
#[utoipa::path(
    get,
    path = "/v1/services",
    responses((status = 200, description = "All listings", body = Vec<ServiceListing>)),
    tag = "services"
)]
pub(crate) async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceListing>>, AppError> {
    let services = ServiceCatalog::new(state.store.clone()).list().await?;
    Ok(Json(services))
}

/// GET /v1/services/:id — One listing.
#[utoipa::path(
    get,
    path = "/v1/services/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Listing found", body = ServiceListing),
        (status = 404, description = "Listing not found", body = crate::error::ErrorBody),
    ),
    tag = "services"
)]
pub(crate) async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceListing>, AppError> {
    let service = ServiceCatalog::new(state.store.clone())
        .get(ServiceId(id))
        .await?;
    Ok(Json(service))
}

/// POST /v1/services/:id/approve — Approve a pending listing.
#[utoipa::path(
    post,
    path = "/v1/services/{id}/approve",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Listing approved", body = ServiceListing),
        (status = 403, description = "Admin only", body = crate::error::ErrorBody),
        (status = 409, description = "Not pending approval", body = crate::error::ErrorBody),
    ),
    tag = "services"
)]
pub(crate) async fn approve_service(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceListing>, AppError> {
    let service = ServiceCatalog::new(state.store.clone())
        .approve(&actor, ServiceId(id))
        .await?;
    Ok(Json(service))
}

/// POST /v1/services/:id/pause — Pause an active listing.
#[utoipa::path(
    post,
    path = "/v1/services/{id}/pause",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Listing paused", body = ServiceListing),
        (status = 403, description = "Owner or admin only", body = crate::error::ErrorBody),
        (status = 409, description = "Not active", body = crate::error::ErrorBody),
    ),
    tag = "services"
)]
pub(crate) async fn pause_service(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceListing>, AppError> {
    let service = ServiceCatalog::new(state.store.clone())
        .pause(&actor, ServiceId(id))
        .await?;
    Ok(Json(service))
}
