//! # Side-Effect Descriptions
//!
//! Every successful transition produces a bounded, deterministic list of
//! [`Effect`] values: zero or more notifications addressed to the
//! counterpart(s) not responsible for the action, and exactly one
//! realtime broadcast naming the transition.
//!
//! The engine only *describes* effects. A single dispatcher loop at the
//! service boundary executes them after the transactional write commits,
//! catching and logging failures — notification delivery can never fail
//! or roll back a state change. Keeping the descriptions here, as plain
//! data, is what lets tests assert the exact effect set of a transition
//! without mocking any transport.

use serde::{Deserialize, Serialize};

use gigbay_core::UserId;

use crate::dispute::{CommentRole, Dispute, DisputeComment};
use crate::offer::Offer;
use crate::order::{Deliverable, Order};
use crate::review::Review;

// ─── Effect types ───────────────────────────────────────────────────

/// Notification categories, used for client-side routing and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationCategory {
    OfferReceived,
    OfferAccepted,
    OfferRejected,
    OfferExpired,
    OrderReceived,
    OrderRejected,
    OrderCancelled,
    DeliverySubmitted,
    RevisionRequested,
    OrderCompleted,
    DisputeOpened,
    DisputeComment,
    DisputeInReview,
    DisputeResolved,
    DisputeWithdrawn,
    ReviewReceived,
}

/// A notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notify {
    pub recipient: UserId,
    pub title: String,
    pub body: String,
    pub category: NotificationCategory,
    pub payload: serde_json::Value,
}

/// A realtime event fanned out to the entity room and participant rooms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Broadcast {
    /// Event name, naming the transition (e.g. `order.delivered`).
    pub event: &'static str,
    /// The entity room, e.g. `order:<uuid>`.
    pub channel: String,
    /// Users whose personal rooms also receive the event.
    pub participants: Vec<UserId>,
    /// The updated entity, serialized.
    pub entity: serde_json::Value,
    /// Transition-specific extra payload.
    pub extra: Option<serde_json::Value>,
}

/// One side effect a transition requires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Effect {
    Notify(Notify),
    Broadcast(Broadcast),
}

fn entity_json<T: Serialize>(entity: &T) -> serde_json::Value {
    serde_json::to_value(entity).unwrap_or(serde_json::Value::Null)
}

// ─── Offer transitions ──────────────────────────────────────────────

/// Effects of a seller creating an offer: the client is told.
pub fn offer_created(offer: &Offer, actor_name: &str) -> Vec<Effect> {
    vec![
        Effect::Notify(Notify {
            recipient: offer.client_id,
            title: "New offer received".into(),
            body: format!(
                "{actor_name} sent you an offer: {} {} for \"{}\"",
                offer.price, offer.currency, offer.scope_of_work
            ),
            category: NotificationCategory::OfferReceived,
            payload: serde_json::json!({ "offer_id": offer.id }),
        }),
        Effect::Broadcast(Broadcast {
            event: "offer.created",
            channel: offer.id.to_string(),
            participants: vec![offer.client_id, offer.freelancer_id],
            entity: entity_json(offer),
            extra: None,
        }),
    ]
}

/// Effects of the client accepting an offer: the seller is told, and the
/// broadcast carries the order that came into existence with it.
pub fn offer_accepted(offer: &Offer, order: &Order, actor_name: &str) -> Vec<Effect> {
    vec![
        Effect::Notify(Notify {
            recipient: offer.freelancer_id,
            title: "Offer accepted".into(),
            body: format!(
                "{actor_name} accepted your offer. Order {} is now in progress.",
                order.order_number
            ),
            category: NotificationCategory::OfferAccepted,
            payload: serde_json::json!({ "offer_id": offer.id, "order_id": order.id }),
        }),
        Effect::Broadcast(Broadcast {
            event: "offer.accepted",
            channel: offer.id.to_string(),
            participants: vec![offer.client_id, offer.freelancer_id],
            entity: entity_json(offer),
            extra: Some(serde_json::json!({ "order": entity_json(order) })),
        }),
    ]
}

/// Effects of the client rejecting an offer.
pub fn offer_rejected(offer: &Offer, actor_name: &str) -> Vec<Effect> {
    let reason = offer.rejection_reason.as_deref().unwrap_or("no reason given");
    vec![
        Effect::Notify(Notify {
            recipient: offer.freelancer_id,
            title: "Offer rejected".into(),
            body: format!("{actor_name} declined your offer: {reason}"),
            category: NotificationCategory::OfferRejected,
            payload: serde_json::json!({ "offer_id": offer.id }),
        }),
        Effect::Broadcast(Broadcast {
            event: "offer.rejected",
            channel: offer.id.to_string(),
            participants: vec![offer.client_id, offer.freelancer_id],
            entity: entity_json(offer),
            extra: None,
        }),
    ]
}

/// Effects of the maintenance sweep expiring an unanswered offer.
pub fn offer_expired(offer: &Offer) -> Vec<Effect> {
    vec![
        Effect::Notify(Notify {
            recipient: offer.freelancer_id,
            title: "Offer expired".into(),
            body: "Your offer expired without an answer.".into(),
            category: NotificationCategory::OfferExpired,
            payload: serde_json::json!({ "offer_id": offer.id }),
        }),
        Effect::Broadcast(Broadcast {
            event: "offer.expired",
            channel: offer.id.to_string(),
            participants: vec![offer.client_id, offer.freelancer_id],
            entity: entity_json(offer),
            extra: None,
        }),
    ]
}

// ─── Order transitions ──────────────────────────────────────────────

/// Effects of a client purchasing a service directly: the seller is told.
pub fn order_created(order: &Order, actor_name: &str) -> Vec<Effect> {
    vec![
        Effect::Notify(Notify {
            recipient: order.freelancer_id,
            title: "New order received".into(),
            body: format!(
                "{actor_name} placed order {} — accept it to start work.",
                order.order_number
            ),
            category: NotificationCategory::OrderReceived,
            payload: serde_json::json!({ "order_id": order.id }),
        }),
        order_broadcast("order.created", order, None),
    ]
}

/// Effects of the seller accepting a pending order.
///
/// No notification: the seller acted, and the client learns through the
/// realtime event.
pub fn order_accepted(order: &Order) -> Vec<Effect> {
    vec![order_broadcast("order.accepted", order, None)]
}

/// Effects of the seller rejecting a pending order.
pub fn order_rejected(order: &Order, actor_name: &str) -> Vec<Effect> {
    let reason = order.rejection_reason.as_deref().unwrap_or("no reason given");
    vec![
        Effect::Notify(Notify {
            recipient: order.client_id,
            title: "Order rejected".into(),
            body: format!("{actor_name} declined order {}: {reason}", order.order_number),
            category: NotificationCategory::OrderRejected,
            payload: serde_json::json!({ "order_id": order.id }),
        }),
        order_broadcast("order.rejected", order, None),
    ]
}

/// Effects of either party cancelling: the party who did not act is told.
pub fn order_cancelled(order: &Order, actor_id: UserId, actor_name: &str) -> Vec<Effect> {
    let reason = order
        .cancellation_reason
        .as_deref()
        .unwrap_or("no reason given");
    let mut effects: Vec<Effect> = [order.client_id, order.freelancer_id]
        .into_iter()
        .filter(|party| *party != actor_id)
        .map(|party| {
            Effect::Notify(Notify {
                recipient: party,
                title: "Order cancelled".into(),
                body: format!(
                    "{actor_name} cancelled order {}: {reason}",
                    order.order_number
                ),
                category: NotificationCategory::OrderCancelled,
                payload: serde_json::json!({ "order_id": order.id }),
            })
        })
        .collect();
    effects.push(order_broadcast("order.cancelled", order, None));
    effects
}

/// Effects of the seller submitting work.
pub fn delivery_submitted(
    order: &Order,
    deliverable: &Deliverable,
    actor_name: &str,
) -> Vec<Effect> {
    let what = if deliverable.is_revision {
        "a revised delivery"
    } else {
        "a delivery"
    };
    vec![
        Effect::Notify(Notify {
            recipient: order.client_id,
            title: "Delivery submitted".into(),
            body: format!(
                "{actor_name} submitted {what} for order {} — review it to complete the order.",
                order.order_number
            ),
            category: NotificationCategory::DeliverySubmitted,
            payload: serde_json::json!({
                "order_id": order.id,
                "deliverable_id": deliverable.id,
            }),
        }),
        order_broadcast(
            "order.delivered",
            order,
            Some(serde_json::json!({ "deliverable": entity_json(deliverable) })),
        ),
    ]
}

/// Effects of the client sending the work back.
pub fn revision_requested(order: &Order, reason: &str, actor_name: &str) -> Vec<Effect> {
    vec![
        Effect::Notify(Notify {
            recipient: order.freelancer_id,
            title: "Revision requested".into(),
            body: format!(
                "{actor_name} requested a revision on order {}: {reason}",
                order.order_number
            ),
            category: NotificationCategory::RevisionRequested,
            payload: serde_json::json!({ "order_id": order.id }),
        }),
        order_broadcast("order.revision_requested", order, None),
    ]
}

/// Effects of the client accepting a deliverable.
pub fn order_completed(order: &Order, actor_name: &str) -> Vec<Effect> {
    vec![
        Effect::Notify(Notify {
            recipient: order.freelancer_id,
            title: "Order completed".into(),
            body: format!(
                "{actor_name} accepted your delivery — order {} is complete.",
                order.order_number
            ),
            category: NotificationCategory::OrderCompleted,
            payload: serde_json::json!({ "order_id": order.id }),
        }),
        order_broadcast("order.completed", order, None),
    ]
}

// ─── Dispute transitions ────────────────────────────────────────────

/// Effects of the client opening a dispute.
pub fn dispute_opened(order: &Order, dispute: &Dispute, actor_name: &str) -> Vec<Effect> {
    vec![
        Effect::Notify(Notify {
            recipient: order.freelancer_id,
            title: "Dispute opened".into(),
            body: format!(
                "{actor_name} opened a dispute on order {}: {}",
                order.order_number, dispute.reason
            ),
            category: NotificationCategory::DisputeOpened,
            payload: serde_json::json!({ "order_id": order.id, "dispute_id": dispute.id }),
        }),
        Effect::Broadcast(Broadcast {
            event: "dispute.opened",
            channel: dispute.id.to_string(),
            participants: vec![dispute.client_id, dispute.freelancer_id],
            entity: entity_json(dispute),
            extra: Some(serde_json::json!({ "order": entity_json(order) })),
        }),
    ]
}

/// Effects of a comment landing in a dispute thread.
///
/// Both parties minus the author are told; staff comments notify both.
pub fn dispute_comment_added(dispute: &Dispute, comment: &DisputeComment) -> Vec<Effect> {
    let author_label = match comment.role {
        CommentRole::Client => "The client",
        CommentRole::Freelancer => "The freelancer",
        CommentRole::Admin => "Marketplace staff",
        CommentRole::Agent => "A support agent",
    };
    let mut effects: Vec<Effect> = [dispute.client_id, dispute.freelancer_id]
        .into_iter()
        .filter(|party| *party != comment.user_id)
        .map(|party| {
            Effect::Notify(Notify {
                recipient: party,
                title: "New dispute comment".into(),
                body: format!("{author_label} commented on the dispute: {}", comment.content),
                category: NotificationCategory::DisputeComment,
                payload: serde_json::json!({
                    "dispute_id": dispute.id,
                    "comment_id": comment.id,
                }),
            })
        })
        .collect();
    effects.push(Effect::Broadcast(Broadcast {
        event: "dispute.comment_added",
        channel: dispute.id.to_string(),
        participants: vec![dispute.client_id, dispute.freelancer_id],
        entity: entity_json(comment),
        extra: None,
    }));
    effects
}

/// Effects of an admin taking a dispute into review: both parties are told.
pub fn dispute_review_started(dispute: &Dispute) -> Vec<Effect> {
    let mut effects: Vec<Effect> = [dispute.client_id, dispute.freelancer_id]
        .into_iter()
        .map(|party| {
            Effect::Notify(Notify {
                recipient: party,
                title: "Dispute under review".into(),
                body: "Marketplace staff are now reviewing the dispute.".into(),
                category: NotificationCategory::DisputeInReview,
                payload: serde_json::json!({ "dispute_id": dispute.id }),
            })
        })
        .collect();
    effects.push(Effect::Broadcast(Broadcast {
        event: "dispute.review_started",
        channel: dispute.id.to_string(),
        participants: vec![dispute.client_id, dispute.freelancer_id],
        entity: entity_json(dispute),
        extra: None,
    }));
    effects
}

/// Effects of an admin resolving a dispute: both parties are told.
pub fn dispute_resolved(dispute: &Dispute, order: &Order) -> Vec<Effect> {
    let resolution = dispute
        .admin_resolution
        .as_deref()
        .unwrap_or("resolved by marketplace staff");
    let mut effects: Vec<Effect> = [dispute.client_id, dispute.freelancer_id]
        .into_iter()
        .map(|party| {
            Effect::Notify(Notify {
                recipient: party,
                title: "Dispute resolved".into(),
                body: format!(
                    "The dispute on order {} was resolved: {resolution}",
                    order.order_number
                ),
                category: NotificationCategory::DisputeResolved,
                payload: serde_json::json!({
                    "dispute_id": dispute.id,
                    "order_id": order.id,
                    "outcome": dispute.outcome,
                }),
            })
        })
        .collect();
    effects.push(Effect::Broadcast(Broadcast {
        event: "dispute.resolved",
        channel: dispute.id.to_string(),
        participants: vec![dispute.client_id, dispute.freelancer_id],
        entity: entity_json(dispute),
        extra: Some(serde_json::json!({ "order": entity_json(order) })),
    }));
    effects
}

/// Effects of the client withdrawing a dispute: the seller is told.
pub fn dispute_withdrawn(dispute: &Dispute, order: &Order, actor_name: &str) -> Vec<Effect> {
    vec![
        Effect::Notify(Notify {
            recipient: dispute.freelancer_id,
            title: "Dispute withdrawn".into(),
            body: format!(
                "{actor_name} withdrew the dispute on order {}.",
                order.order_number
            ),
            category: NotificationCategory::DisputeWithdrawn,
            payload: serde_json::json!({ "dispute_id": dispute.id, "order_id": order.id }),
        }),
        Effect::Broadcast(Broadcast {
            event: "dispute.withdrawn",
            channel: dispute.id.to_string(),
            participants: vec![dispute.client_id, dispute.freelancer_id],
            entity: entity_json(dispute),
            extra: Some(serde_json::json!({ "order": entity_json(order) })),
        }),
    ]
}

// ─── Reviews ────────────────────────────────────────────────────────

/// Effects of the client reviewing a completed order.
pub fn review_submitted(review: &Review, order: &Order, actor_name: &str) -> Vec<Effect> {
    vec![
        Effect::Notify(Notify {
            recipient: review.freelancer_id,
            title: "New review".into(),
            body: format!(
                "{actor_name} left a {}-star review on order {}.",
                review.rating, order.order_number
            ),
            category: NotificationCategory::ReviewReceived,
            payload: serde_json::json!({ "review_id": review.id, "order_id": order.id }),
        }),
        Effect::Broadcast(Broadcast {
            event: "review.submitted",
            channel: order.id.to_string(),
            participants: vec![order.client_id, order.freelancer_id],
            entity: entity_json(review),
            extra: None,
        }),
    ]
}

fn order_broadcast(
    event: &'static str,
    order: &Order,
    extra: Option<serde_json::Value>,
) -> Effect {
    Effect::Broadcast(Broadcast {
        event,
        channel: order.id.to_string(),
        participants: vec![order.client_id, order.freelancer_id],
        entity: entity_json(order),
        extra,
    })
}

// ─── Tests ──────────────────────────────────────────────────────────
