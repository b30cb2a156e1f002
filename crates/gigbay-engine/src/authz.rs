//! # Authorization Matrix
//!
//! Pure decision functions consulted by every transition entry point.
//! No side effects, no I/O: each check takes the acting user's derived
//! [`Capabilities`](gigbay_core::Capabilities) plus the entity, and
//! returns `Ok(())` or an [`WorkflowError::Unauthorized`] naming the
//! violated rule.
//!
//! ## Matrix
//!
//! | Operation                         | Permitted                                  |
//! |-----------------------------------|--------------------------------------------|
//! | offer create                      | the service's seller                       |
//! | offer accept / reject             | the offer's client                         |
//! | offer view                        | either party                               |
//! | order create (direct purchase)    | any buyer-capable actor                    |
//! | order accept / reject             | the order's freelancer                     |
//! | order cancel                      | either party                               |
//! | order deliver                     | the order's freelancer (seller-capable)    |
//! | revision / accept-delivery        | the order's client                         |
//! | dispute open / withdraw / review  | the order's client (withdraw), admin (review) |
//! | dispute comment / view            | either party, admin, or agent              |
//! | dispute resolve, service approve  | admin                                      |
//! | order / offer view                | participants                               |
//!
//! An admin passes every check. Denials are `Unauthorized`, which the
//! boundary maps distinctly from "not found" and from "invalid state".

use gigbay_core::{Actor, WorkflowError};

use crate::dispute::Dispute;
use crate::offer::Offer;
use crate::order::Order;
use crate::service::ServiceListing;

// ── Services ────────────────────────────────────────────────────────

/// Posting a service requires a seller-capable actor.
pub fn create_service(actor: &Actor) -> Result<(), WorkflowError> {
    if actor.capabilities.can_sell {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        "create service",
        "only seller-capable accounts may post services",
    ))
}

/// Approving a listing is marketplace staff work.
pub fn approve_service(actor: &Actor) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        "approve service",
        "only an admin may approve listings",
    ))
}

/// Pausing a listing: its owner, or an admin.
pub fn pause_service(actor: &Actor, service: &ServiceListing) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin || actor.is_user(service.freelancer_id) {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        "pause service",
        "only the listing's seller may pause it",
    ))
}

// ── Offers ──────────────────────────────────────────────────────────

/// Creating an offer: a seller-capable actor, on their own service.
pub fn create_offer(actor: &Actor, service: &ServiceListing) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin {
        return Ok(());
    }
    if !actor.capabilities.can_sell {
        return Err(WorkflowError::unauthorized(
            "create offer",
            "only seller-capable accounts may create offers",
        ));
    }
    if !actor.is_user(service.freelancer_id) {
        return Err(WorkflowError::unauthorized(
            "create offer",
            "only the service's seller may offer it",
        ));
    }
    Ok(())
}

/// Accepting or rejecting an offer: the client it was addressed to.
pub fn decide_offer(
    actor: &Actor,
    offer: &Offer,
    action: &'static str,
) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin || actor.is_user(offer.client_id) {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        action,
        "only the offer's client may decide it",
    ))
}

/// Viewing an offer: its parties, admin, or agent.
pub fn view_offer(actor: &Actor, offer: &Offer) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin
        || actor.capabilities.is_agent
        || actor.is_user(offer.client_id)
        || actor.is_user(offer.freelancer_id)
    {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        "view offer",
        "only the offer's parties may view it",
    ))
}

// ── Orders ──────────────────────────────────────────────────────────

/// A direct purchase requires a buyer-capable actor.
pub fn create_order(actor: &Actor) -> Result<(), WorkflowError> {
    if actor.capabilities.can_buy {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        "create order",
        "only buyer-capable accounts may purchase services",
    ))
}

/// Accepting or rejecting a pending order: the freelancer it is addressed to.
pub fn decide_order(
    actor: &Actor,
    order: &Order,
    action: &'static str,
) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin || actor.is_user(order.freelancer_id) {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        action,
        "only the order's freelancer may decide it",
    ))
}

/// Cancelling: either party, or an admin.
pub fn cancel_order(actor: &Actor, order: &Order) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin || order.is_participant(actor.id) {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        "cancel order",
        "only the order's parties may cancel it",
    ))
}

/// Delivering work: the order's freelancer, acting with sell capability.
pub fn submit_delivery(actor: &Actor, order: &Order) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin {
        return Ok(());
    }
    if !actor.is_user(order.freelancer_id) {
        return Err(WorkflowError::unauthorized(
            "submit delivery",
            "only the order's freelancer may deliver",
        ));
    }
    if !actor.capabilities.can_sell {
        return Err(WorkflowError::unauthorized(
            "submit delivery",
            "account is not seller-capable",
        ));
    }
    Ok(())
}

/// Client-side verdicts: revision, delivery acceptance, dispute opening,
/// dispute withdrawal, review.
pub fn client_verdict(
    actor: &Actor,
    order: &Order,
    action: &'static str,
) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin || actor.is_user(order.client_id) {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        action,
        "only the order's client may do this",
    ))
}

/// Viewing an order: its parties, admin, or agent.
pub fn view_order(actor: &Actor, order: &Order) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin
        || actor.capabilities.is_agent
        || order.is_participant(actor.id)
    {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        "view order",
        "only the order's parties may view it",
    ))
}

// ── Disputes ────────────────────────────────────────────────────────

/// Commenting: the dispute's parties, admin, or agent.
pub fn comment_on_dispute(actor: &Actor, dispute: &Dispute) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin
        || actor.capabilities.is_agent
        || dispute.is_participant(actor.id)
    {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        "add dispute comment",
        "only the dispute's parties or marketplace staff may comment",
    ))
}

/// Viewing a dispute or its thread: same circle as commenting.
pub fn view_dispute(actor: &Actor, dispute: &Dispute) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin
        || actor.capabilities.is_agent
        || dispute.is_participant(actor.id)
    {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        "view dispute",
        "only the dispute's parties or marketplace staff may view it",
    ))
}

/// Taking a dispute into review, or resolving it: admin only.
pub fn resolve_dispute(actor: &Actor) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        "resolve dispute",
        "only an admin may resolve disputes",
    ))
}

/// Withdrawing a dispute: the client who opened it.
pub fn withdraw_dispute(actor: &Actor, dispute: &Dispute) -> Result<(), WorkflowError> {
    if actor.capabilities.is_admin || actor.is_user(dispute.client_id) {
        return Ok(());
    }
    Err(WorkflowError::unauthorized(
        "withdraw dispute",
        "only the dispute's client may withdraw it",
    ))
}

// ─── Tests ──────────────────────────────────────────────────────────
