//! # Dispute Lifecycle
//!
//! An escalation the client opens against a delivered order. While a
//! dispute is active (`OPEN` or `IN_REVIEW`) the owning order is
//! `DISPUTED` and blocked from delivery, revision, and completion.
//!
//! ## States
//!
//! ```text
//! OPEN ──▶ IN_REVIEW ──▶ RESOLVED   (admin resolution, with outcome)
//!  │            │
//!  └──▶ RESOLVED│                   (admin may resolve without review)
//!  └────────────┴──▶ CLOSED         (client withdraws)
//! ```
//!
//! `RESOLVED` and `CLOSED` are terminal; the comment thread freezes with
//! them. At most one active dispute may exist per order — the store
//! enforces that uniqueness at commit time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use gigbay_core::{Actor, CommentId, DisputeId, OrderId, UserId, WorkflowError};

use crate::order::Order;

// ─── Status ─────────────────────────────────────────────────────────

/// The lifecycle state of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    /// Filed by the client; counterpart and staff may respond.
    Open,
    /// An admin has taken the case up.
    InReview,
    /// Resolved by an admin with a recorded outcome. Terminal.
    Resolved,
    /// Withdrawn by the client. Terminal.
    Closed,
}

impl DisputeStatus {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }

    /// Whether the comment thread is still writable.
    pub fn accepts_comments(&self) -> bool {
        matches!(self, Self::Open | Self::InReview)
    }

    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InReview => "IN_REVIEW",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an admin resolution does to the owning order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeOutcome {
    /// The delivered work stands; the order completes.
    CompleteOrder,
    /// The engagement ends; the order is cancelled.
    CancelOrder,
    /// The seller gets another attempt; the order returns to work.
    ReopenWork,
}

// ─── Dispute ────────────────────────────────────────────────────────

/// Input for opening a dispute against a delivered order.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenDispute {
    pub reason: String,
    pub description: String,
    pub attachments: Vec<String>,
}

/// An escalation against a delivered order, with its comment thread.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Dispute {
    #[schema(value_type = uuid::Uuid)]
    pub id: DisputeId,
    #[schema(value_type = uuid::Uuid)]
    pub order_id: OrderId,
    #[schema(value_type = uuid::Uuid)]
    pub client_id: UserId,
    #[schema(value_type = uuid::Uuid)]
    pub freelancer_id: UserId,
    pub reason: String,
    pub description: String,
    pub attachments: Vec<String>,
    pub status: DisputeStatus,
    /// The admin's written resolution, once resolved.
    pub admin_resolution: Option<String>,
    /// The outcome applied to the order, once resolved.
    pub outcome: Option<DisputeOutcome>,
    pub created_at: DateTime<Utc>,
    /// Optimistic concurrency counter, managed by the store.
    pub version: u64,
}

impl Dispute {
    /// Open a dispute against a delivered order.
    ///
    /// Validates inputs only; the state check on the order and the
    /// one-active-dispute invariant are the caller's and the store's.
    pub fn open(
        order: &Order,
        input: OpenDispute,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        if input.reason.trim().is_empty() {
            return Err(WorkflowError::Validation("reason must not be empty".into()));
        }
        if input.description.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "description must not be empty".into(),
            ));
        }

        Ok(Self {
            id: DisputeId::new(),
            order_id: order.id,
            client_id: order.client_id,
            freelancer_id: order.freelancer_id,
            reason: input.reason,
            description: input.description,
            attachments: input.attachments,
            status: DisputeStatus::Open,
            admin_resolution: None,
            outcome: None,
            created_at: now,
            version: 0,
        })
    }

    /// An admin takes the case up (`OPEN → IN_REVIEW`).
    pub fn begin_review(&mut self) -> Result<(), WorkflowError> {
        if self.status != DisputeStatus::Open {
            return Err(WorkflowError::invalid_state(
                "dispute",
                "begin review",
                self.status,
                "OPEN",
            ));
        }
        self.status = DisputeStatus::InReview;
        Ok(())
    }

    /// Admin resolution (`OPEN | IN_REVIEW → RESOLVED`).
    pub fn resolve(
        &mut self,
        resolution: &str,
        outcome: DisputeOutcome,
    ) -> Result<(), WorkflowError> {
        self.require_active("resolve dispute")?;
        if resolution.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "resolution must not be empty".into(),
            ));
        }
        self.admin_resolution = Some(resolution.trim().to_string());
        self.outcome = Some(outcome);
        self.status = DisputeStatus::Resolved;
        Ok(())
    }

    /// Client withdrawal (`OPEN | IN_REVIEW → CLOSED`).
    pub fn close(&mut self) -> Result<(), WorkflowError> {
        self.require_active("withdraw dispute")?;
        self.status = DisputeStatus::Closed;
        Ok(())
    }

    /// Whether `user` is a party to this dispute.
    pub fn is_participant(&self, user: UserId) -> bool {
        self.client_id == user || self.freelancer_id == user
    }

    fn require_active(&self, action: &'static str) -> Result<(), WorkflowError> {
        if self.status.is_terminal() {
            return Err(WorkflowError::invalid_state(
                "dispute",
                action,
                self.status,
                "OPEN or IN_REVIEW",
            ));
        }
        Ok(())
    }
}

// ─── Comments ───────────────────────────────────────────────────────

/// The capacity in which a comment author participates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentRole {
    Client,
    Freelancer,
    Admin,
    Agent,
}

/// One message in a dispute's append-only comment thread.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DisputeComment {
    #[schema(value_type = uuid::Uuid)]
    pub id: CommentId,
    #[schema(value_type = uuid::Uuid)]
    pub dispute_id: DisputeId,
    #[schema(value_type = uuid::Uuid)]
    pub user_id: UserId,
    pub role: CommentRole,
    pub content: String,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl DisputeComment {
    /// Append a comment to an active dispute's thread.
    ///
    /// The author's capacity is derived from their relation to the
    /// dispute, not from the raw role claim: the dispute's client comments
    /// as `CLIENT` even if their account could also sell.
    pub fn create(
        dispute: &Dispute,
        author: &Actor,
        content: &str,
        attachments: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        if !dispute.status.accepts_comments() {
            return Err(WorkflowError::invalid_state(
                "dispute",
                "add comment",
                dispute.status,
                "OPEN or IN_REVIEW",
            ));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(WorkflowError::Validation(
                "comment content must not be empty".into(),
            ));
        }

        let role = if author.id == dispute.client_id {
            CommentRole::Client
        } else if author.id == dispute.freelancer_id {
            CommentRole::Freelancer
        } else if author.capabilities.is_admin {
            CommentRole::Admin
        } else {
            CommentRole::Agent
        };

        Ok(Self {
            id: CommentId::new(),
            dispute_id: dispute.id,
            user_id: author.id,
            role,
            content: content.to_string(),
            attachments,
            created_at: now,
        })
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{DeliverableType, NewDelivery, Order, OrderStatus};
    use crate::service::{CreateService, ServiceListing};
    use gigbay_core::{Price, Role};

    fn delivered_order() -> Order {
        let mut svc = ServiceListing::create(
            CreateService {
                freelancer_id: UserId::new(),
                title: "Banner".into(),
                description: "Animated banner".into(),
                price: Price::parse("60").unwrap(),
                currency: "USD".into(),
                delivery_time_days: 3,
                revisions_included: 1,
            },
            Utc::now(),
        )
        .unwrap();
        svc.approve().unwrap();
        let mut order = Order::direct_purchase(&svc, UserId::new(), None, Utc::now()).unwrap();
        order.accept(Utc::now()).unwrap();
        order
            .submit_delivery(
                NewDelivery {
                    kind: DeliverableType::Message,
                    payload: "final banner attached".into(),
                    is_revision: false,
                },
                Utc::now(),
            )
            .unwrap();
        order
    }

    fn open_dispute(order: &Order) -> Dispute {
        Dispute::open(
            order,
            OpenDispute {
                reason: "quality".into(),
                description: "not what was agreed".into(),
                attachments: vec![],
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn open_dispute_carries_order_parties() {
        let order = delivered_order();
        let dispute = open_dispute(&order);
        assert_eq!(dispute.status, DisputeStatus::Open);
        assert_eq!(dispute.client_id, order.client_id);
        assert_eq!(dispute.freelancer_id, order.freelancer_id);
    }

    #[test]
    fn open_requires_reason_and_description() {
        let order = delivered_order();
        assert!(Dispute::open(
            &order,
            OpenDispute {
                reason: "".into(),
                description: "d".into(),
                attachments: vec![],
            },
            Utc::now(),
        )
        .is_err());
        assert!(Dispute::open(
            &order,
            OpenDispute {
                reason: "r".into(),
                description: " ".into(),
                attachments: vec![],
            },
            Utc::now(),
        )
        .is_err());
    }

    #[test]
    fn resolution_records_outcome_and_freezes() {
        let order = delivered_order();
        let mut dispute = open_dispute(&order);
        dispute.begin_review().unwrap();
        dispute
            .resolve("partial refund agreed", DisputeOutcome::CancelOrder)
            .unwrap();
        assert_eq!(dispute.status, DisputeStatus::Resolved);
        assert_eq!(dispute.outcome, Some(DisputeOutcome::CancelOrder));
        assert_eq!(
            dispute.admin_resolution.as_deref(),
            Some("partial refund agreed")
        );

        assert!(dispute.close().is_err());
        assert!(dispute
            .resolve("again", DisputeOutcome::CompleteOrder)
            .is_err());
    }

    #[test]
    fn resolve_works_from_open_without_review() {
        let order = delivered_order();
        let mut dispute = open_dispute(&order);
        dispute
            .resolve("clear-cut case", DisputeOutcome::CompleteOrder)
            .unwrap();
        assert_eq!(dispute.status, DisputeStatus::Resolved);
    }

    #[test]
    fn begin_review_only_from_open() {
        let order = delivered_order();
        let mut dispute = open_dispute(&order);
        dispute.begin_review().unwrap();
        assert!(dispute.begin_review().is_err());
    }

    #[test]
    fn comments_on_terminal_dispute_rejected() {
        let order = delivered_order();
        let mut dispute = open_dispute(&order);
        let client = Actor::new(dispute.client_id, Role::Client, "Cara");

        DisputeComment::create(&dispute, &client, "please look at v2", vec![], Utc::now())
            .unwrap();

        dispute.close().unwrap();
        let err =
            DisputeComment::create(&dispute, &client, "one more thing", vec![], Utc::now())
                .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));
    }

    #[test]
    fn comment_role_derived_from_dispute_relation() {
        let order = delivered_order();
        let dispute = open_dispute(&order);

        let freelancer = Actor::new(dispute.freelancer_id, Role::Freelancer, "Fred");
        let comment =
            DisputeComment::create(&dispute, &freelancer, "v2 fixed it", vec![], Utc::now())
                .unwrap();
        assert_eq!(comment.role, CommentRole::Freelancer);

        let admin = Actor::new(UserId::new(), Role::Admin, "Staff");
        let comment =
            DisputeComment::create(&dispute, &admin, "reviewing now", vec![], Utc::now()).unwrap();
        assert_eq!(comment.role, CommentRole::Admin);

        let agent = Actor::new(UserId::new(), Role::Agent, "Support");
        let comment =
            DisputeComment::create(&dispute, &agent, "ticket linked", vec![], Utc::now()).unwrap();
        assert_eq!(comment.role, CommentRole::Agent);
    }

    #[test]
    fn empty_comment_rejected() {
        let order = delivered_order();
        let dispute = open_dispute(&order);
        let client = Actor::new(dispute.client_id, Role::Client, "Cara");
        assert!(
            DisputeComment::create(&dispute, &client, "   ", vec![], Utc::now()).is_err()
        );
    }

    #[test]
    fn full_escalation_keeps_order_and_dispute_in_step() {
        let mut order = delivered_order();
        let mut dispute = open_dispute(&order);
        order.mark_disputed(Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Disputed);

        dispute
            .resolve("seller delivered to spec", DisputeOutcome::CompleteOrder)
            .unwrap();
        order
            .apply_dispute_outcome(DisputeOutcome::CompleteOrder, Utc::now())
            .unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
    }
}
