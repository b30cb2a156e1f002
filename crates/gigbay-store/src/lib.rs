//! # gigbay-store — Durable Storage for the Workflow Engine
//!
//! Defines [`EngagementStore`], the narrow contract the workflow services
//! use for every read and write, plus two implementations:
//!
//! - [`postgres::PgStore`] — the production store. Serializes concurrent
//!   transitions with optimistic version checks executed inside a single
//!   SQL transaction, backstopped by commit-time unique constraints (one
//!   order per offer, one active dispute per order).
//! - [`memory::MemoryStore`] — an in-process store with the same
//!   observable semantics under one write lock. Used when no
//!   `DATABASE_URL` is configured, and by the test suites.
//!
//! ## Versioning protocol
//!
//! Every mutable record carries a `version` counter. An `update_*` call
//! treats the record's `version` field as the version observed at read
//! time, persists `version + 1`, and fails with
//! [`StoreError::VersionConflict`] if another writer got there first.
//! Compound operations (`commit_offer_acceptance`, `commit_dispute_open`,
//! `commit_dispute_settlement`) apply the same guard to every row they
//! touch and commit all writes or none. The state machine's race
//! guarantees live here, not in process memory — two concurrent accepts
//! of one offer resolve at the store, whichever process they came from.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use gigbay_core::{DisputeId, OfferId, OrderId, ServiceId, UserId};
use gigbay_engine::effects::{NotificationCategory, Notify};
use gigbay_engine::{Dispute, DisputeComment, Offer, Order, Review, ServiceListing};

pub use memory::MemoryStore;
pub use postgres::PgStore;

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors surfaced by store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The row to update does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// A concurrent writer advanced the row since it was read.
    #[error("concurrent update on {entity} {id}")]
    VersionConflict {
        entity: &'static str,
        id: String,
    },

    /// A commit-time uniqueness invariant rejected the write.
    #[error("uniqueness violated: {0}")]
    UniqueViolation(String),

    /// The backend failed (connection, SQL, serialization).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn version_conflict(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::VersionConflict {
            entity,
            id: id.to_string(),
        }
    }
}

// The API boundary maps `StoreError` alongside `WorkflowError`:
// `NotFound`/`VersionConflict`/`UniqueViolation` become the taxonomy's
// not-found and conflict responses, `Backend` becomes an internal error.

// ─── Notifications ──────────────────────────────────────────────────

/// A persisted notification, as the dispatcher stores it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationRecord {
    pub id: Uuid,
    #[schema(value_type = uuid::Uuid)]
    pub recipient: UserId,
    pub title: String,
    pub body: String,
    #[schema(value_type = String)]
    pub category: NotificationCategory,
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl NotificationRecord {
    /// Materialize a notification effect for persistence.
    pub fn from_effect(notify: &Notify, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient: notify.recipient,
            title: notify.title.clone(),
            body: notify.body.clone(),
            category: notify.category,
            payload: notify.payload.clone(),
            read: false,
            created_at: now,
        }
    }
}

// ─── Store contract ─────────────────────────────────────────────────

/// The storage contract consumed by the workflow services.
///
/// This is the only path that writes offer/order/dispute state; the
/// transition functions own the state machine, the store owns atomicity
/// and uniqueness.
#[async_trait]
pub trait EngagementStore: Send + Sync {
    // ── Services ────────────────────────────────────────────────────

    async fn insert_service(&self, service: &ServiceListing) -> Result<(), StoreError>;
    async fn service(&self, id: ServiceId) -> Result<Option<ServiceListing>, StoreError>;
    async fn list_services(&self) -> Result<Vec<ServiceListing>, StoreError>;
    /// Version-guarded write of a mutated service.
    async fn update_service(&self, service: &ServiceListing) -> Result<ServiceListing, StoreError>;

    // ── Offers ──────────────────────────────────────────────────────

    async fn insert_offer(&self, offer: &Offer) -> Result<(), StoreError>;
    async fn offer(&self, id: OfferId) -> Result<Option<Offer>, StoreError>;
    /// Offers where the user is either party, newest first.
    async fn offers_for_user(&self, user: UserId) -> Result<Vec<Offer>, StoreError>;
    /// Version-guarded write of a mutated offer.
    async fn update_offer(&self, offer: &Offer) -> Result<Offer, StoreError>;
    /// Pending offers created before `cutoff` (expiry sweep input).
    async fn stale_pending_offers(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Offer>, StoreError>;

    /// Atomically persist an accepted offer together with the order it
    /// created. Exactly-once: the offer write is version-guarded and the
    /// order insert is rejected if any order already references the offer.
    async fn commit_offer_acceptance(
        &self,
        offer: &Offer,
        order: &Order,
    ) -> Result<(Offer, Order), StoreError>;

    // ── Orders ──────────────────────────────────────────────────────

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError>;
    async fn order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
    /// Orders where the user is either party, newest first.
    async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>, StoreError>;
    /// Version-guarded write of a mutated order.
    async fn update_order(&self, order: &Order) -> Result<Order, StoreError>;

    /// Atomically persist a disputed order together with its new dispute.
    /// Rejected if an active dispute already exists for the order.
    async fn commit_dispute_open(
        &self,
        order: &Order,
        dispute: &Dispute,
    ) -> Result<(Order, Dispute), StoreError>;

    /// Atomically persist a dispute leaving its active phase together
    /// with the order state that settlement produced.
    async fn commit_dispute_settlement(
        &self,
        dispute: &Dispute,
        order: &Order,
    ) -> Result<(Dispute, Order), StoreError>;

    // ── Disputes ────────────────────────────────────────────────────

    async fn dispute(&self, id: DisputeId) -> Result<Option<Dispute>, StoreError>;
    /// The order's dispute in `OPEN` or `IN_REVIEW`, if any.
    async fn active_dispute_for_order(
        &self,
        order: OrderId,
    ) -> Result<Option<Dispute>, StoreError>;
    /// Version-guarded write of a mutated dispute.
    async fn update_dispute(&self, dispute: &Dispute) -> Result<Dispute, StoreError>;

    /// Append a comment. Fails with `VersionConflict` if the dispute left
    /// its active phase after the caller read it — the thread freeze is
    /// enforced at commit time, not only at validation time.
    async fn insert_dispute_comment(&self, comment: &DisputeComment) -> Result<(), StoreError>;
    /// The dispute's thread, oldest first.
    async fn dispute_comments(
        &self,
        dispute: DisputeId,
    ) -> Result<Vec<DisputeComment>, StoreError>;

    // ── Reviews ─────────────────────────────────────────────────────

    /// Rejected if the order already has a review.
    async fn insert_review(&self, review: &Review) -> Result<(), StoreError>;
    async fn review_for_order(&self, order: OrderId) -> Result<Option<Review>, StoreError>;

    // ── Notifications ───────────────────────────────────────────────

    async fn insert_notification(&self, record: &NotificationRecord) -> Result<(), StoreError>;
    /// The user's notifications, newest first.
    async fn notifications_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<NotificationRecord>, StoreError>;
    /// Returns `false` if the notification does not exist or belongs to
    /// someone else.
    async fn mark_notification_read(&self, user: UserId, id: Uuid) -> Result<bool, StoreError>;
}
