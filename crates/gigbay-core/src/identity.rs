//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all identifiers in the marketplace domain.
//! These prevent accidental identifier confusion — you cannot pass
//! an `OfferId` where an `OrderId` is expected, and a mixed-up join
//! between a dispute and its order is a compile error rather than a
//! data-corruption incident.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a marketplace user (client, freelancer, admin, agent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

/// Unique identifier for a posted service listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub Uuid);

/// Unique identifier for a seller's offer to a specific client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(pub Uuid);

/// Unique identifier for a bound engagement (order/contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

/// Unique identifier for one submitted unit of work against an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliverableId(pub Uuid);

/// Unique identifier for a dispute opened against a delivered order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisputeId(pub Uuid);

/// Unique identifier for a comment in a dispute thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentId(pub Uuid);

/// Unique identifier for a review left on a completed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewId(pub Uuid);

/// Unique identifier for the conversation an offer or order is attached to.
///
/// Conversations themselves live outside this system; the workflow only
/// carries the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

macro_rules! uuid_id_impls {
    ($($ty:ident => $prefix:literal),+ $(,)?) => {
        $(
            impl $ty {
                /// Generate a new random identifier.
                pub fn new() -> Self {
                    Self(Uuid::new_v4())
                }

                /// Access the inner UUID.
                pub fn as_uuid(&self) -> &Uuid {
                    &self.0
                }
            }

            impl Default for $ty {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, concat!($prefix, ":{}"), self.0)
                }
            }

            impl From<Uuid> for $ty {
                fn from(value: Uuid) -> Self {
                    Self(value)
                }
            }
        )+
    };
}

uuid_id_impls! {
    UserId => "user",
    ServiceId => "service",
    OfferId => "offer",
    OrderId => "order",
    DeliverableId => "deliverable",
    DisputeId => "dispute",
    CommentId => "comment",
    ReviewId => "review",
    ConversationId => "conversation",
}
