//! # Order Lifecycle State Machine
//!
//! The binding engagement between a client and a freelancer, created
//! exactly once from an accepted offer or directly from a service
//! purchase. Every status change in the system goes through a method on
//! [`Order`]; no other code path writes order state.
//!
//! ## States
//!
//! ```text
//! PENDING_ACCEPTANCE ──▶ IN_PROGRESS ──▶ DELIVERED ──▶ COMPLETED
//!        │                    │  ▲            │
//!        │                    │  └────────────┤ (revised delivery)
//!        │                    │     REVISION_REQUESTED
//!        │                    │                │
//!        ▼                    ▼                ▼
//!    CANCELLED            CANCELLED        DISPUTED ──▶ COMPLETED
//!                                              │        CANCELLED
//!                                              └──────▶ IN_PROGRESS / DELIVERED
//!                                                  (resolution / withdrawal)
//! ```
//!
//! `COMPLETED` and `CANCELLED` are terminal. `DISPUTED` is reachable only
//! from `DELIVERED`, and leaving it is an admin resolution or a client
//! withdrawal — both arrive via the dispute subsystem, never directly.
//!
//! ## Design Decision
//!
//! Statuses are an enum with validated runtime transitions rather than
//! typestate types. Which transitions are legal depends on the caller's
//! role and on data (which deliverable, whose dispute), so the checks are
//! runtime checks either way; the enum keeps one `Order` type across the
//! store and the API surface. The transition table in
//! [`OrderStatus::successors`] is the single source of truth the tests
//! check observed paths against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use gigbay_core::{
    ConversationId, DeliverableId, OfferId, OrderId, Price, ServiceId, UserId, WorkflowError,
};

use crate::dispute::DisputeOutcome;
use crate::offer::Offer;
use crate::service::ServiceListing;

// ─── Status ─────────────────────────────────────────────────────────

/// The lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created by a direct purchase; awaiting the seller's acceptance.
    PendingAcceptance,
    /// Work is formally underway.
    InProgress,
    /// The seller has submitted work; awaiting the client's verdict.
    Delivered,
    /// The client sent the work back with a revision reason.
    RevisionRequested,
    /// An active dispute owns this order; delivery and completion are blocked.
    Disputed,
    /// The client accepted a deliverable. Terminal.
    Completed,
    /// Rejected or cancelled before completion. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Whether this state accepts no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// The statuses legally reachable from this one.
    ///
    /// This table *is* the state diagram; the monotonicity tests replay
    /// recorded transitions against it.
    pub fn successors(&self) -> &'static [OrderStatus] {
        match self {
            Self::PendingAcceptance => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Delivered, Self::Cancelled],
            Self::Delivered => &[Self::RevisionRequested, Self::Completed, Self::Disputed],
            Self::RevisionRequested => &[Self::Delivered],
            Self::Disputed => &[Self::Completed, Self::Cancelled, Self::InProgress, Self::Delivered],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingAcceptance => "PENDING_ACCEPTANCE",
            Self::InProgress => "IN_PROGRESS",
            Self::Delivered => "DELIVERED",
            Self::RevisionRequested => "REVISION_REQUESTED",
            Self::Disputed => "DISPUTED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Deliverables ───────────────────────────────────────────────────

/// How a deliverable's payload should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliverableType {
    /// Payload is a stored-file reference.
    File,
    /// Payload is free text.
    Message,
    /// Payload is an external URL.
    Link,
}

/// Input for one delivery submission.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDelivery {
    pub kind: DeliverableType,
    pub payload: String,
    pub is_revision: bool,
}

/// One submitted unit of work against an order. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Deliverable {
    #[schema(value_type = uuid::Uuid)]
    pub id: DeliverableId,
    pub kind: DeliverableType,
    pub payload: String,
    pub is_revision: bool,
    pub created_at: DateTime<Utc>,
}

/// One revision request recorded against an order. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevisionRequest {
    pub reason: String,
    pub requested_at: DateTime<Utc>,
}

/// Record of one observed status change, kept on the order itself.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub at: DateTime<Utc>,
}

// ─── Order ──────────────────────────────────────────────────────────

/// The binding engagement the lifecycle state machine governs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    #[schema(value_type = uuid::Uuid)]
    pub id: OrderId,
    /// Unique human-readable reference, e.g. `GB-93AD41E07C2B`.
    pub order_number: String,
    /// The accepted offer this order was created from, if any.
    #[schema(value_type = Option<uuid::Uuid>)]
    pub offer_id: Option<OfferId>,
    #[schema(value_type = uuid::Uuid)]
    pub service_id: ServiceId,
    #[schema(value_type = uuid::Uuid)]
    pub client_id: UserId,
    #[schema(value_type = uuid::Uuid)]
    pub freelancer_id: UserId,
    #[schema(value_type = Option<uuid::Uuid>)]
    pub conversation_id: Option<ConversationId>,
    #[schema(value_type = String)]
    pub price: Price,
    pub currency: String,
    pub delivery_time_days: u32,
    pub revisions_included: u32,
    pub scope_of_work: String,
    pub status: OrderStatus,
    pub rejection_reason: Option<String>,
    pub cancellation_reason: Option<String>,
    /// Every delivery submitted against this order, in submission order.
    pub deliverables: Vec<Deliverable>,
    /// Every revision the client requested, in request order.
    pub revision_requests: Vec<RevisionRequest>,
    /// The deliverable the client accepted, once completed.
    #[schema(value_type = Option<uuid::Uuid>)]
    pub accepted_deliverable_id: Option<DeliverableId>,
    /// Ordered log of observed status changes.
    pub transitions: Vec<OrderTransition>,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency counter, managed by the store.
    pub version: u64,
}

impl Order {
    /// Construct the order bound to an offer the client just accepted.
    ///
    /// Starts `IN_PROGRESS`: the client agreed to the terms by accepting,
    /// so there is no pending-acceptance step. Called only from
    /// [`Offer::accept_into_order`].
    pub(crate) fn from_accepted_offer(offer: &Offer, now: DateTime<Utc>) -> Self {
        let id = OrderId::new();
        Self {
            id,
            order_number: Self::generate_number(id),
            offer_id: Some(offer.id),
            service_id: offer.service_id,
            client_id: offer.client_id,
            freelancer_id: offer.freelancer_id,
            conversation_id: offer.conversation_id,
            price: offer.price,
            currency: offer.currency.clone(),
            delivery_time_days: offer.delivery_time_days,
            revisions_included: offer.revisions_included,
            scope_of_work: offer.scope_of_work.clone(),
            status: OrderStatus::InProgress,
            rejection_reason: None,
            cancellation_reason: None,
            deliverables: Vec::new(),
            revision_requests: Vec::new(),
            accepted_deliverable_id: None,
            transitions: Vec::new(),
            created_at: now,
            accepted_at: Some(now),
            completed_at: None,
            version: 0,
        }
    }

    /// Construct an order for a direct service purchase (no prior offer).
    ///
    /// Starts `PENDING_ACCEPTANCE`: the seller has not yet agreed to take
    /// the work. The service must be orderable.
    pub fn direct_purchase(
        service: &ServiceListing,
        client_id: UserId,
        conversation_id: Option<ConversationId>,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        service.require_orderable("create order")?;
        if client_id == service.freelancer_id {
            return Err(WorkflowError::Validation(
                "cannot order a service from its own seller".into(),
            ));
        }

        let id = OrderId::new();
        Ok(Self {
            id,
            order_number: Self::generate_number(id),
            offer_id: None,
            service_id: service.id,
            client_id,
            freelancer_id: service.freelancer_id,
            conversation_id,
            price: service.price,
            currency: service.currency.clone(),
            delivery_time_days: service.delivery_time_days,
            revisions_included: service.revisions_included,
            scope_of_work: service.description.clone(),
            status: OrderStatus::PendingAcceptance,
            rejection_reason: None,
            cancellation_reason: None,
            deliverables: Vec::new(),
            revision_requests: Vec::new(),
            accepted_deliverable_id: None,
            transitions: Vec::new(),
            created_at: now,
            accepted_at: None,
            completed_at: None,
            version: 0,
        })
    }

    /// Derive the human-readable order number from the order id.
    pub fn generate_number(id: OrderId) -> String {
        let hex = id.as_uuid().simple().to_string().to_uppercase();
        format!("GB-{}", &hex[..12])
    }

    // ── Transitions ─────────────────────────────────────────────────

    /// Seller takes the work on (`PENDING_ACCEPTANCE → IN_PROGRESS`).
    ///
    /// A repeat call on an already-running order fails with
    /// `InvalidState` — the caller is told nothing changed, not given a
    /// silent success.
    pub fn accept(&mut self, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.require_status("accept order", &[OrderStatus::PendingAcceptance])?;
        self.accepted_at = Some(now);
        self.set_status(OrderStatus::InProgress, now);
        Ok(())
    }

    /// Seller declines the work (`PENDING_ACCEPTANCE → CANCELLED`).
    pub fn reject(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.require_status("reject order", &[OrderStatus::PendingAcceptance])?;
        let reason = non_empty(reason, "rejection reason")?;
        self.rejection_reason = Some(reason);
        self.set_status(OrderStatus::Cancelled, now);
        Ok(())
    }

    /// Either party backs out before delivery
    /// (`PENDING_ACCEPTANCE | IN_PROGRESS → CANCELLED`).
    pub fn cancel(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.require_status(
            "cancel order",
            &[OrderStatus::PendingAcceptance, OrderStatus::InProgress],
        )?;
        let reason = non_empty(reason, "cancellation reason")?;
        self.cancellation_reason = Some(reason);
        self.set_status(OrderStatus::Cancelled, now);
        Ok(())
    }

    /// Seller submits work (`IN_PROGRESS | REVISION_REQUESTED → DELIVERED`).
    ///
    /// Appends the deliverable and returns it. Delivering to a
    /// `PENDING_ACCEPTANCE` order is illegal — work has not formally
    /// started.
    pub fn submit_delivery(
        &mut self,
        delivery: NewDelivery,
        now: DateTime<Utc>,
    ) -> Result<Deliverable, WorkflowError> {
        self.require_status(
            "submit delivery",
            &[OrderStatus::InProgress, OrderStatus::RevisionRequested],
        )?;
        let payload = non_empty(&delivery.payload, "deliverable payload")?;
        if delivery.kind == DeliverableType::Link
            && !(payload.starts_with("http://") || payload.starts_with("https://"))
        {
            return Err(WorkflowError::Validation(
                "link deliverable payload must be an http(s) URL".into(),
            ));
        }

        let deliverable = Deliverable {
            id: DeliverableId::new(),
            kind: delivery.kind,
            payload,
            is_revision: delivery.is_revision,
            created_at: now,
        };
        self.deliverables.push(deliverable.clone());
        self.set_status(OrderStatus::Delivered, now);
        Ok(deliverable)
    }

    /// Client sends the work back (`DELIVERED → REVISION_REQUESTED`).
    pub fn request_revision(
        &mut self,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        self.require_status("request revision", &[OrderStatus::Delivered])?;
        let reason = non_empty(reason, "revision reason")?;
        self.revision_requests.push(RevisionRequest {
            reason,
            requested_at: now,
        });
        self.set_status(OrderStatus::RevisionRequested, now);
        Ok(())
    }

    /// Client accepts a specific deliverable (`DELIVERED → COMPLETED`).
    ///
    /// Fails `NotFound` if the deliverable does not belong to this order.
    pub fn accept_delivery(
        &mut self,
        deliverable_id: DeliverableId,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        self.require_status("accept delivery", &[OrderStatus::Delivered])?;
        if !self.deliverables.iter().any(|d| d.id == deliverable_id) {
            return Err(WorkflowError::not_found("deliverable", deliverable_id));
        }
        self.accepted_deliverable_id = Some(deliverable_id);
        self.completed_at = Some(now);
        self.set_status(OrderStatus::Completed, now);
        Ok(())
    }

    /// An active dispute takes ownership (`DELIVERED → DISPUTED`).
    ///
    /// Called only by the dispute subsystem, in the same atomic unit that
    /// creates the dispute row.
    pub fn mark_disputed(&mut self, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.require_status("open dispute", &[OrderStatus::Delivered])?;
        self.set_status(OrderStatus::Disputed, now);
        Ok(())
    }

    /// Apply an admin resolution outcome (`DISPUTED → …`).
    pub fn apply_dispute_outcome(
        &mut self,
        outcome: DisputeOutcome,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        self.require_status("resolve dispute", &[OrderStatus::Disputed])?;
        match outcome {
            DisputeOutcome::CompleteOrder => {
                self.completed_at = Some(now);
                self.set_status(OrderStatus::Completed, now);
            }
            DisputeOutcome::CancelOrder => {
                self.cancellation_reason = Some("cancelled by dispute resolution".into());
                self.set_status(OrderStatus::Cancelled, now);
            }
            DisputeOutcome::ReopenWork => {
                self.set_status(OrderStatus::InProgress, now);
            }
        }
        Ok(())
    }

    /// Client withdrew the dispute (`DISPUTED → DELIVERED`).
    ///
    /// The order returns to awaiting the client's verdict on the existing
    /// delivery.
    pub fn release_from_dispute(&mut self, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.require_status("withdraw dispute", &[OrderStatus::Disputed])?;
        self.set_status(OrderStatus::Delivered, now);
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Whether `user` is a party to this order.
    pub fn is_participant(&self, user: UserId) -> bool {
        self.client_id == user || self.freelancer_id == user
    }

    /// The most recent deliverable, if any.
    pub fn latest_deliverable(&self) -> Option<&Deliverable> {
        self.deliverables.last()
    }

    // ── Internals ───────────────────────────────────────────────────

    fn require_status(
        &self,
        action: &'static str,
        allowed: &[OrderStatus],
    ) -> Result<(), WorkflowError> {
        if !allowed.contains(&self.status) {
            let required = allowed
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(WorkflowError::invalid_state(
                "order",
                action,
                self.status,
                required,
            ));
        }
        Ok(())
    }

    fn set_status(&mut self, to: OrderStatus, at: DateTime<Utc>) {
        self.transitions.push(OrderTransition {
            from: self.status,
            to,
            at,
        });
        self.status = to;
    }
}

fn non_empty(value: &str, field: &str) -> Result<String, WorkflowError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::Validation(format!(
            "{field} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{CreateService, ServiceListing};

    fn active_service() -> ServiceListing {
        let mut svc = ServiceListing::create(
            CreateService {
                freelancer_id: UserId::new(),
                title: "Landing page".into(),
                description: "One-page site, responsive".into(),
                price: Price::parse("100.00").unwrap(),
                currency: "USD".into(),
                delivery_time_days: 5,
                revisions_included: 2,
            },
            Utc::now(),
        )
        .unwrap();
        svc.approve().unwrap();
        svc
    }

    fn pending_order() -> Order {
        Order::direct_purchase(&active_service(), UserId::new(), None, Utc::now()).unwrap()
    }

    fn in_progress_order() -> Order {
        let mut order = pending_order();
        order.accept(Utc::now()).unwrap();
        order
    }

    fn delivered_order() -> Order {
        let mut order = in_progress_order();
        order
            .submit_delivery(
                NewDelivery {
                    kind: DeliverableType::Message,
                    payload: "done, see attachment".into(),
                    is_revision: false,
                },
                Utc::now(),
            )
            .unwrap();
        order
    }

    // ── Creation ────────────────────────────────────────────────────

    #[test]
    fn direct_purchase_awaits_acceptance() {
        let order = pending_order();
        assert_eq!(order.status, OrderStatus::PendingAcceptance);
        assert!(order.accepted_at.is_none());
        assert!(order.order_number.starts_with("GB-"));
        assert_eq!(order.order_number.len(), 15);
    }

    #[test]
    fn direct_purchase_of_paused_service_rejected() {
        let mut svc = active_service();
        svc.pause().unwrap();
        let err = Order::direct_purchase(&svc, UserId::new(), None, Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));
    }

    #[test]
    fn self_purchase_rejected() {
        let svc = active_service();
        let err = Order::direct_purchase(&svc, svc.freelancer_id, None, Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    // ── Accept / reject / cancel ────────────────────────────────────

    #[test]
    fn accept_moves_to_in_progress_once() {
        let mut order = pending_order();
        order.accept(Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::InProgress);
        assert!(order.accepted_at.is_some());

        // Idempotent rejection of the repeat, not silent success.
        let err = order.accept(Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));
    }

    #[test]
    fn reject_records_reason() {
        let mut order = pending_order();
        order.reject("fully booked this month", Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(
            order.rejection_reason.as_deref(),
            Some("fully booked this month")
        );
    }

    #[test]
    fn cancel_allowed_pre_delivery_only() {
        let mut order = pending_order();
        order.cancel("changed my mind", Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);

        let mut order = in_progress_order();
        order.cancel("scope grew too large", Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);

        let mut order = delivered_order();
        let err = order.cancel("too late", Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));
    }

    #[test]
    fn cancel_requires_reason() {
        let mut order = in_progress_order();
        assert!(order.cancel("", Utc::now()).is_err());
        assert_eq!(order.status, OrderStatus::InProgress);
    }

    // ── Delivery / revision / completion ────────────────────────────

    #[test]
    fn delivery_before_acceptance_is_illegal() {
        let mut order = pending_order();
        let err = order
            .submit_delivery(
                NewDelivery {
                    kind: DeliverableType::Message,
                    payload: "eager delivery".into(),
                    is_revision: false,
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));
        assert!(order.deliverables.is_empty());
    }

    #[test]
    fn delivery_appends_and_moves_to_delivered() {
        let order = delivered_order();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.deliverables.len(), 1);
        assert!(!order.deliverables[0].is_revision);
    }

    #[test]
    fn empty_payload_rejected() {
        let mut order = in_progress_order();
        let err = order
            .submit_delivery(
                NewDelivery {
                    kind: DeliverableType::File,
                    payload: "  ".into(),
                    is_revision: false,
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn link_payload_must_be_url() {
        let mut order = in_progress_order();
        let err = order
            .submit_delivery(
                NewDelivery {
                    kind: DeliverableType::Link,
                    payload: "ftp://example.com/files".into(),
                    is_revision: false,
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn revision_loop_returns_to_delivered() {
        let mut order = delivered_order();
        order.request_revision("needs more contrast", Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::RevisionRequested);
        assert_eq!(order.revision_requests.len(), 1);

        order
            .submit_delivery(
                NewDelivery {
                    kind: DeliverableType::Link,
                    payload: "https://example.com/v2".into(),
                    is_revision: true,
                },
                Utc::now(),
            )
            .unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.deliverables.len(), 2);
        assert!(order.deliverables[1].is_revision);
    }

    #[test]
    fn revision_only_from_delivered() {
        let mut order = in_progress_order();
        assert!(order.request_revision("too early", Utc::now()).is_err());
    }

    #[test]
    fn accept_delivery_completes_and_stamps() {
        let mut order = delivered_order();
        let deliverable_id = order.latest_deliverable().unwrap().id;
        let now = Utc::now();
        order.accept_delivery(deliverable_id, now).unwrap();

        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.completed_at, Some(now));
        assert_eq!(order.accepted_deliverable_id, Some(deliverable_id));

        // Terminal: nothing further is legal.
        assert!(order.cancel("undo", Utc::now()).is_err());
        assert!(order.request_revision("again", Utc::now()).is_err());
    }

    #[test]
    fn accept_delivery_rejects_foreign_deliverable() {
        let mut order = delivered_order();
        let err = order
            .accept_delivery(DeliverableId::new(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { .. }));
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    // ── Dispute interactions ────────────────────────────────────────

    #[test]
    fn dispute_only_from_delivered() {
        let mut order = in_progress_order();
        assert!(order.mark_disputed(Utc::now()).is_err());

        let mut order = delivered_order();
        order.mark_disputed(Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Disputed);
    }

    #[test]
    fn disputed_order_blocks_delivery_and_completion() {
        let mut order = delivered_order();
        let deliverable_id = order.latest_deliverable().unwrap().id;
        order.mark_disputed(Utc::now()).unwrap();

        assert!(order.request_revision("blocked", Utc::now()).is_err());
        assert!(order.accept_delivery(deliverable_id, Utc::now()).is_err());
        assert!(order
            .submit_delivery(
                NewDelivery {
                    kind: DeliverableType::Message,
                    payload: "blocked".into(),
                    is_revision: true,
                },
                Utc::now(),
            )
            .is_err());
        assert!(order.cancel("blocked", Utc::now()).is_err());
    }

    #[test]
    fn resolution_outcomes_map_to_order_states() {
        let mut order = delivered_order();
        order.mark_disputed(Utc::now()).unwrap();
        order
            .apply_dispute_outcome(DisputeOutcome::CompleteOrder, Utc::now())
            .unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert!(order.completed_at.is_some());

        let mut order = delivered_order();
        order.mark_disputed(Utc::now()).unwrap();
        order
            .apply_dispute_outcome(DisputeOutcome::CancelOrder, Utc::now())
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);

        let mut order = delivered_order();
        order.mark_disputed(Utc::now()).unwrap();
        order
            .apply_dispute_outcome(DisputeOutcome::ReopenWork, Utc::now())
            .unwrap();
        assert_eq!(order.status, OrderStatus::InProgress);
    }

    #[test]
    fn withdrawal_returns_order_to_delivered() {
        let mut order = delivered_order();
        order.mark_disputed(Utc::now()).unwrap();
        order.release_from_dispute(Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    // ── Monotonicity ────────────────────────────────────────────────

    #[test]
    fn transition_log_follows_the_diagram() {
        let mut order = pending_order();
        order.accept(Utc::now()).unwrap();
        order
            .submit_delivery(
                NewDelivery {
                    kind: DeliverableType::Message,
                    payload: "v1".into(),
                    is_revision: false,
                },
                Utc::now(),
            )
            .unwrap();
        order.request_revision("tweak", Utc::now()).unwrap();
        order
            .submit_delivery(
                NewDelivery {
                    kind: DeliverableType::Message,
                    payload: "v2".into(),
                    is_revision: true,
                },
                Utc::now(),
            )
            .unwrap();
        let id = order.latest_deliverable().unwrap().id;
        order.accept_delivery(id, Utc::now()).unwrap();

        for t in &order.transitions {
            assert!(
                t.from.successors().contains(&t.to),
                "observed illegal transition {} -> {}",
                t.from,
                t.to
            );
        }
        assert_eq!(order.transitions.first().unwrap().from, OrderStatus::PendingAcceptance);
        assert_eq!(order.transitions.last().unwrap().to, OrderStatus::Completed);
    }
}
