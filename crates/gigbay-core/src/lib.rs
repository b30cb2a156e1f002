//! # gigbay-core — Foundational Types for the gigbay Marketplace
//!
//! Shared vocabulary for every other crate in the workspace:
//!
//! - **Identifiers** (`identity.rs`): one newtype per entity namespace.
//!   An `OfferId` cannot be passed where an `OrderId` is expected.
//! - **Actors** (`actor.rs`): the role enum and the derived capability
//!   tags that authorization decisions consume.
//! - **Money** (`money.rs`): `Price`, an opaque decimal amount. The
//!   workflow engine carries prices; it never computes with them.
//! - **Errors** (`error.rs`): the five-member workflow error taxonomy
//!   shared by the engine, the store, and the API boundary.

pub mod actor;
pub mod error;
pub mod identity;
pub mod money;

// ─── Identifier re-exports ──────────────────────────────────────────

pub use identity::{
    CommentId, ConversationId, DeliverableId, DisputeId, OfferId, OrderId, ReviewId, ServiceId,
    UserId,
};

// ─── Actor re-exports ───────────────────────────────────────────────

pub use actor::{Actor, Capabilities, Role};

// ─── Money re-exports ───────────────────────────────────────────────

pub use money::Price;

// ─── Error re-exports ───────────────────────────────────────────────

pub use error::WorkflowError;
