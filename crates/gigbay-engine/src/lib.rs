//! # gigbay-engine — Engagement Lifecycle State Machines
//!
//! The workflow core of the marketplace: the rules governing how a seller's
//! [`Offer`] becomes a binding [`Order`], how an order moves through
//! delivery, revision, completion, and cancellation, and how a
//! [`Dispute`] freezes and then releases a delivered order.
//!
//! ## State machines
//!
//! - **Offer** (`offer.rs`): `PENDING → ACCEPTED | REJECTED | EXPIRED`.
//!   Accepting an offer also constructs the order it binds to — one
//!   operation, so callers cannot invoke the halves out of order.
//!
//! - **Order** (`order.rs`):
//!   `PENDING_ACCEPTANCE → IN_PROGRESS → DELIVERED →
//!   {REVISION_REQUESTED → DELIVERED, COMPLETED, DISPUTED}`, with
//!   `CANCELLED` reachable from the two pre-delivery states only.
//!
//! - **Dispute** (`dispute.rs`): `OPEN → IN_REVIEW → RESOLVED`, with
//!   `CLOSED` for client withdrawal. While a dispute is active its order
//!   is `DISPUTED` and blocked from delivery and completion.
//!
//! ## Design
//!
//! Everything in this crate is pure: transitions take the current entity
//! and a clock value, mutate in place, and return either a typed error or
//! the list of [`effects::Effect`] descriptions the boundary must execute
//! after the transactional write commits. No I/O happens here, which is
//! what makes the effect set of every transition independently assertable
//! in tests.

pub mod authz;
pub mod dispute;
pub mod effects;
pub mod offer;
pub mod order;
pub mod review;
pub mod service;

// ─── Offer re-exports ───────────────────────────────────────────────

pub use offer::{CreateOffer, Offer, OfferStatus};

// ─── Order re-exports ───────────────────────────────────────────────

pub use order::{
    Deliverable, DeliverableType, NewDelivery, Order, OrderStatus, OrderTransition,
    RevisionRequest,
};

// ─── Dispute re-exports ─────────────────────────────────────────────

pub use dispute::{
    CommentRole, Dispute, DisputeComment, DisputeOutcome, DisputeStatus, OpenDispute,
};

// ─── Review re-exports ──────────────────────────────────────────────

pub use review::Review;

// ─── Service re-exports ─────────────────────────────────────────────

pub use service::{CreateService, ServiceListing, ServiceStatus};

// ─── Effect re-exports ──────────────────────────────────────────────

pub use effects::{Broadcast, Effect, NotificationCategory, Notify};
