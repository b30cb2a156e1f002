//! # Offer Lifecycle
//!
//! A seller's proposal of terms to a specific client. Not yet binding:
//! the binding engagement is the [`Order`](crate::order::Order) an
//! accepted offer converts into.
//!
//! ## States
//!
//! ```text
//! PENDING ──▶ ACCEPTED   (client agrees; the order is created in the
//!    │                    same atomic unit, exactly once)
//!    ├──────▶ REJECTED   (client declines, with a reason)
//!    └──────▶ EXPIRED    (maintenance sweep; offer sat unanswered)
//! ```
//!
//! All three right-hand states are terminal. An offer is mutated only by
//! the client it was addressed to (or an admin acting as that client);
//! that rule lives in [`crate::authz`], not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use gigbay_core::{ConversationId, OfferId, Price, ServiceId, UserId, WorkflowError};

use crate::order::Order;
use crate::service::ServiceListing;

/// The lifecycle state of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    /// Awaiting the client's decision.
    Pending,
    /// Client accepted; an order exists for this offer. Terminal.
    Accepted,
    /// Client rejected. Terminal.
    Rejected,
    /// Sat unanswered past its lifetime. Terminal.
    Expired,
}

impl OfferStatus {
    /// Whether this state accepts no further mutation.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating an offer against an active service.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOffer {
    pub client_id: UserId,
    pub conversation_id: Option<ConversationId>,
    pub price: Price,
    pub delivery_time_days: u32,
    pub revisions_included: u32,
    pub scope_of_work: String,
    pub cancellation_policy: Option<String>,
}

/// A seller's proposed terms to a specific client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Offer {
    #[schema(value_type = uuid::Uuid)]
    pub id: OfferId,
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
    pub cancellation_policy: Option<String>,
    pub status: OfferStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Optimistic concurrency counter, managed by the store.
    pub version: u64,
}

impl Offer {
    /// Create a pending offer from a seller against their active service.
    ///
    /// The service must be orderable; the caller has already checked the
    /// actor owns it.
    pub fn create(
        service: &ServiceListing,
        input: CreateOffer,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        service.require_orderable("create offer")?;
        if input.scope_of_work.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "scope_of_work must not be empty".into(),
            ));
        }
        if input.delivery_time_days == 0 {
            return Err(WorkflowError::Validation(
                "delivery_time_days must be at least 1".into(),
            ));
        }
        if input.client_id == service.freelancer_id {
            return Err(WorkflowError::Validation(
                "cannot offer a service to its own seller".into(),
            ));
        }

        Ok(Self {
            id: OfferId::new(),
            service_id: service.id,
            client_id: input.client_id,
            freelancer_id: service.freelancer_id,
            conversation_id: input.conversation_id,
            price: input.price,
            currency: service.currency.clone(),
            delivery_time_days: input.delivery_time_days,
            revisions_included: input.revisions_included,
            scope_of_work: input.scope_of_work,
            cancellation_policy: input.cancellation_policy,
            status: OfferStatus::Pending,
            rejection_reason: None,
            created_at: now,
            version: 0,
        })
    }

    /// Accept the offer and construct the order it binds to.
    ///
    /// One operation on purpose: the offer flip and the order construction
    /// are never exposed as separately callable halves, so the store can
    /// commit them in a single transaction. The order starts `IN_PROGRESS`
    /// — by accepting, the client has already agreed to the terms, so the
    /// pending-acceptance step is skipped.
    pub fn accept_into_order(&mut self, now: DateTime<Utc>) -> Result<Order, WorkflowError> {
        self.require_pending("accept offer")?;
        self.status = OfferStatus::Accepted;
        Ok(Order::from_accepted_offer(self, now))
    }

    /// Reject the offer with a reason. No order is ever created.
    pub fn reject(&mut self, reason: &str, _now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.require_pending("reject offer")?;
        if reason.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "rejection reason must not be empty".into(),
            ));
        }
        self.status = OfferStatus::Rejected;
        self.rejection_reason = Some(reason.to_string());
        Ok(())
    }

    /// Expire an unanswered offer (maintenance sweep).
    pub fn expire(&mut self) -> Result<(), WorkflowError> {
        self.require_pending("expire offer")?;
        self.status = OfferStatus::Expired;
        Ok(())
    }

    /// Whether the offer has sat unanswered longer than `ttl_days`.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl_days: i64) -> bool {
        self.status == OfferStatus::Pending
            && now.signed_duration_since(self.created_at) > chrono::Duration::days(ttl_days)
    }

    fn require_pending(&self, action: &'static str) -> Result<(), WorkflowError> {
        if self.status != OfferStatus::Pending {
            return Err(WorkflowError::invalid_state(
                "offer",
                action,
                self.status,
                "PENDING",
            ));
        }
        Ok(())
    }
}
