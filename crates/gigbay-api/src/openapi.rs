//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single spec served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "gigbay API",
        version = "0.1.0",
        description = "Services marketplace workflow engine: offers, orders, deliveries, disputes, reviews, notifications.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Services
        crate::routes::services::create_service,
        crate::routes::services::list_services,
        crate::routes::services::get_service,
        crate::routes::services::approve_service,
        crate::routes::services::pause_service,
        // Offers
        crate::routes::offers::create_offer,
        crate::routes::offers::list_offers,
        crate::routes::offers::get_offer,
        crate::routes::offers::accept_offer,
        crate::routes::offers::reject_offer,
        // Orders
        crate::routes::orders::create_order,
        crate::routes::orders::list_orders,
        crate::routes::orders::get_order,
        crate::routes::orders::accept_order,
        crate::routes::orders::reject_order,
        crate::routes::orders::cancel_order,
        crate::routes::orders::submit_delivery,
        crate::routes::orders::request_revision,
        crate::routes::orders::accept_delivery,
        crate::routes::orders::open_dispute,
        crate::routes::orders::leave_review,
        crate::routes::orders::get_review,
        // Disputes
        crate::routes::disputes::get_dispute,
        crate::routes::disputes::list_comments,
        crate::routes::disputes::add_comment,
        crate::routes::disputes::begin_review,
        crate::routes::disputes::resolve_dispute,
        crate::routes::disputes::withdraw_dispute,
        // Notifications
        crate::routes::notifications::list_notifications,
        crate::routes::notifications::mark_read,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::services::CreateServiceRequest,
        crate::routes::offers::CreateOfferRequest,
        crate::routes::offers::RejectOfferRequest,
        crate::routes::offers::AcceptOfferResponse,
        crate::routes::orders::CreateOrderRequest,
        crate::routes::orders::ReasonRequest,
        crate::routes::orders::DeliveryRequest,
        crate::routes::orders::CompleteRequest,
        crate::routes::orders::OpenDisputeRequest,
        crate::routes::orders::ReviewRequest,
        crate::routes::orders::OpenDisputeResponse,
        crate::routes::disputes::AddCommentRequest,
        crate::routes::disputes::ResolveDisputeRequest,
        crate::routes::disputes::DisputeSettlementResponse,
        crate::routes::notifications::ReadReceipt,
        gigbay_engine::ServiceListing,
        gigbay_engine::service::ServiceStatus,
        gigbay_engine::Offer,
        gigbay_engine::OfferStatus,
        gigbay_engine::Order,
        gigbay_engine::OrderStatus,
        gigbay_engine::Deliverable,
        gigbay_engine::DeliverableType,
        gigbay_engine::RevisionRequest,
        gigbay_engine::OrderTransition,
        gigbay_engine::Dispute,
        gigbay_engine::DisputeStatus,
        gigbay_engine::DisputeOutcome,
        gigbay_engine::DisputeComment,
        gigbay_engine::CommentRole,
        gigbay_engine::Review,
        gigbay_store::NotificationRecord,
    ))
)]
pub struct ApiDoc;

/// Router serving the assembled spec.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_spec))
}

async fn serve_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
