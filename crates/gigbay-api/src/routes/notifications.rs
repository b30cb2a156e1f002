//! Notification endpoints.
//!
//! - `GET /v1/notifications` — the caller's notifications, newest first
//! - `POST /v1/notifications/:id/read` — mark one as read

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use utoipa::ToSchema;
use uuid::Uuid;

use gigbay_store::NotificationRecord;

use crate::auth::Caller;
use crate::error::AppError;
use crate::state::AppState;

/// Acknowledgement of a read receipt.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ReadReceipt {
    pub id: Uuid,
    pub read: bool,
}

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/notifications", get(list_notifications))
        .route("/v1/notifications/:id/read", post(mark_read))
}

/// GET /v1/notifications — The caller's notifications.
#[utoipa::path(
    get,
    path = "/v1/notifications",
    responses(
        (status = 200, description = "Notifications, newest first", body = Vec<NotificationRecord>),
    ),
    tag = "notifications"
)]
pub(crate) async fn list_notifications(
    State(state): State<AppState>,
    Caller(actor): Caller,
) -> Result<Json<Vec<NotificationRecord>>, AppError> {
    let notifications = state.store.notifications_for_user(actor.id).await?;
    Ok(Json(notifications))
}

/// POST /v1/notifications/:id/read — Mark one notification as read.
#[utoipa::path(
    post,
    path = "/v1/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read", body = ReadReceipt),
        (status = 404, description = "Not the caller's notification", body = crate::error::ErrorBody),
    ),
    tag = "notifications"
)]
pub(crate) async fn mark_read(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<ReadReceipt>, AppError> {
    let marked = state.store.mark_notification_read(actor.id, id).await?;
    if !marked {
        return Err(AppError::NotFound(format!("notification {id} not found")));
    }
    Ok(Json(ReadReceipt { id, read: true }))
}
