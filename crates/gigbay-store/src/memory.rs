//! # In-Memory Store
//!
//! A single-process [`EngagementStore`] used when no database is
//! configured, and by the test suites. One `parking_lot::RwLock` guards
//! all tables, which is what makes the compound commits atomic here: a
//! compound operation takes the write lock once and applies every check
//! and write under it. The lock is never held across an `.await` point —
//! all work inside is synchronous.
//!
//! The observable semantics match the Postgres store: version-guarded
//! updates, one order per offer, one active dispute per order, one review
//! per order, and comment inserts rejected once the thread froze.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use gigbay_core::{CommentId, DisputeId, OfferId, OrderId, ReviewId, ServiceId, UserId};
use gigbay_engine::{
    Dispute, DisputeComment, Offer, OfferStatus, Order, Review, ServiceListing,
};

use crate::{EngagementStore, NotificationRecord, StoreError};

#[derive(Default)]
struct Tables {
    services: HashMap<ServiceId, ServiceListing>,
    offers: HashMap<OfferId, Offer>,
    orders: HashMap<OrderId, Order>,
    disputes: HashMap<DisputeId, Dispute>,
    comments: HashMap<CommentId, DisputeComment>,
    reviews: HashMap<ReviewId, Review>,
    notifications: HashMap<Uuid, NotificationRecord>,
}

/// Thread-safe, cloneable in-memory store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EngagementStore for MemoryStore {
    // ── Services ────────────────────────────────────────────────────

    async fn insert_service(&self, service: &ServiceListing) -> Result<(), StoreError> {
        self.tables
            .write()
            .services
            .insert(service.id, service.clone());
        Ok(())
    }

    async fn service(&self, id: ServiceId) -> Result<Option<ServiceListing>, StoreError> {
        Ok(self.tables.read().services.get(&id).cloned())
    }

    async fn list_services(&self) -> Result<Vec<ServiceListing>, StoreError> {
        let mut all: Vec<_> = self.tables.read().services.values().cloned().collect();
        all.sort_by_key(|s| std::cmp::Reverse(s.created_at));
        Ok(all)
    }

    async fn update_service(
        &self,
        service: &ServiceListing,
    ) -> Result<ServiceListing, StoreError> {
        let mut tables = self.tables.write();
        let current = tables
            .services
            .get(&service.id)
            .ok_or_else(|| StoreError::not_found("service", service.id))?;
        if current.version != service.version {
            return Err(StoreError::version_conflict("service", service.id));
        }
        let mut stored = service.clone();
        stored.version += 1;
        tables.services.insert(stored.id, stored.clone());
        Ok(stored)
    }

    // ── Offers ──────────────────────────────────────────────────────

    async fn insert_offer(&self, offer: &Offer) -> Result<(), StoreError> {
        self.tables.write().offers.insert(offer.id, offer.clone());
        Ok(())
    }

    async fn offer(&self, id: OfferId) -> Result<Option<Offer>, StoreError> {
        Ok(self.tables.read().offers.get(&id).cloned())
    }

    async fn offers_for_user(&self, user: UserId) -> Result<Vec<Offer>, StoreError> {
        let mut hits: Vec<_> = self
            .tables
            .read()
            .offers
            .values()
            .filter(|o| o.client_id == user || o.freelancer_id == user)
            .cloned()
            .collect();
        hits.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(hits)
    }

    async fn update_offer(&self, offer: &Offer) -> Result<Offer, StoreError> {
        let mut tables = self.tables.write();
        let current = tables
            .offers
            .get(&offer.id)
            .ok_or_else(|| StoreError::not_found("offer", offer.id))?;
        if current.version != offer.version {
            return Err(StoreError::version_conflict("offer", offer.id));
        }
        let mut stored = offer.clone();
        stored.version += 1;
        tables.offers.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn stale_pending_offers(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Offer>, StoreError> {
        Ok(self
            .tables
            .read()
            .offers
            .values()
            .filter(|o| o.status == OfferStatus::Pending && o.created_at < cutoff)
            .cloned()
            .collect())
    }

    async fn commit_offer_acceptance(
        &self,
        offer: &Offer,
        order: &Order,
    ) -> Result<(Offer, Order), StoreError> {
        let mut tables = self.tables.write();

        let current = tables
            .offers
            .get(&offer.id)
            .ok_or_else(|| StoreError::not_found("offer", offer.id))?;
        if current.version != offer.version {
            return Err(StoreError::version_conflict("offer", offer.id));
        }
        if tables.orders.values().any(|o| o.offer_id == Some(offer.id)) {
            return Err(StoreError::UniqueViolation(format!(
                "an order already exists for offer {}",
                offer.id
            )));
        }

        let mut stored_offer = offer.clone();
        stored_offer.version += 1;
        tables.offers.insert(stored_offer.id, stored_offer.clone());
        tables.orders.insert(order.id, order.clone());
        Ok((stored_offer, order.clone()))
    }

    // ── Orders ──────────────────────────────────────────────────────

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        self.tables.write().orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.tables.read().orders.get(&id).cloned())
    }

    async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>, StoreError> {
        let mut hits: Vec<_> = self
            .tables
            .read()
            .orders
            .values()
            .filter(|o| o.is_participant(user))
            .cloned()
            .collect();
        hits.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(hits)
    }

    async fn update_order(&self, order: &Order) -> Result<Order, StoreError> {
        let mut tables = self.tables.write();
        let current = tables
            .orders
            .get(&order.id)
            .ok_or_else(|| StoreError::not_found("order", order.id))?;
        if current.version != order.version {
            return Err(StoreError::version_conflict("order", order.id));
        }
        let mut stored = order.clone();
        stored.version += 1;
        tables.orders.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn commit_dispute_open(
        &self,
        order: &Order,
        dispute: &Dispute,
    ) -> Result<(Order, Dispute), StoreError> {
        let mut tables = self.tables.write();

        let current = tables
            .orders
            .get(&order.id)
            .ok_or_else(|| StoreError::not_found("order", order.id))?;
        if current.version != order.version {
            return Err(StoreError::version_conflict("order", order.id));
        }
        if tables
            .disputes
            .values()
            .any(|d| d.order_id == order.id && d.status.accepts_comments())
        {
            return Err(StoreError::UniqueViolation(format!(
                "an active dispute already exists for order {}",
                order.id
            )));
        }

        let mut stored_order = order.clone();
        stored_order.version += 1;
        tables.orders.insert(stored_order.id, stored_order.clone());
        tables.disputes.insert(dispute.id, dispute.clone());
        Ok((stored_order, dispute.clone()))
    }

    async fn commit_dispute_settlement(
        &self,
        dispute: &Dispute,
        order: &Order,
    ) -> Result<(Dispute, Order), StoreError> {
        let mut tables = self.tables.write();

        let current_dispute = tables
            .disputes
            .get(&dispute.id)
            .ok_or_else(|| StoreError::not_found("dispute", dispute.id))?;
        if current_dispute.version != dispute.version {
            return Err(StoreError::version_conflict("dispute", dispute.id));
        }
        let current_order = tables
            .orders
            .get(&order.id)
            .ok_or_else(|| StoreError::not_found("order", order.id))?;
        if current_order.version != order.version {
            return Err(StoreError::version_conflict("order", order.id));
        }

        let mut stored_dispute = dispute.clone();
        stored_dispute.version += 1;
        let mut stored_order = order.clone();
        stored_order.version += 1;
        tables
            .disputes
            .insert(stored_dispute.id, stored_dispute.clone());
        tables.orders.insert(stored_order.id, stored_order.clone());
        Ok((stored_dispute, stored_order))
    }

    // ── Disputes ────────────────────────────────────────────────────

    async fn dispute(&self, id: DisputeId) -> Result<Option<Dispute>, StoreError> {
        Ok(self.tables.read().disputes.get(&id).cloned())
    }

    async fn active_dispute_for_order(
        &self,
        order: OrderId,
    ) -> Result<Option<Dispute>, StoreError> {
        Ok(self
            .tables
            .read()
            .disputes
            .values()
            .find(|d| d.order_id == order && d.status.accepts_comments())
            .cloned())
    }

    async fn update_dispute(&self, dispute: &Dispute) -> Result<Dispute, StoreError> {
        let mut tables = self.tables.write();
        let current = tables
            .disputes
            .get(&dispute.id)
            .ok_or_else(|| StoreError::not_found("dispute", dispute.id))?;
        if current.version != dispute.version {
            return Err(StoreError::version_conflict("dispute", dispute.id));
        }
        let mut stored = dispute.clone();
        stored.version += 1;
        tables.disputes.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn insert_dispute_comment(&self, comment: &DisputeComment) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let dispute = tables
            .disputes
            .get(&comment.dispute_id)
            .ok_or_else(|| StoreError::not_found("dispute", comment.dispute_id))?;
        if !dispute.status.accepts_comments() {
            // The thread froze after the caller validated; losing racer.
            return Err(StoreError::version_conflict("dispute", comment.dispute_id));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn dispute_comments(
        &self,
        dispute: DisputeId,
    ) -> Result<Vec<DisputeComment>, StoreError> {
        let mut thread: Vec<_> = self
            .tables
            .read()
            .comments
            .values()
            .filter(|c| c.dispute_id == dispute)
            .cloned()
            .collect();
        thread.sort_by_key(|c| c.created_at);
        Ok(thread)
    }

    // ── Reviews ─────────────────────────────────────────────────────

    async fn insert_review(&self, review: &Review) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if tables.reviews.values().any(|r| r.order_id == review.order_id) {
            return Err(StoreError::UniqueViolation(format!(
                "order {} already has a review",
                review.order_id
            )));
        }
        tables.reviews.insert(review.id, review.clone());
        Ok(())
    }

    async fn review_for_order(&self, order: OrderId) -> Result<Option<Review>, StoreError> {
        Ok(self
            .tables
            .read()
            .reviews
            .values()
            .find(|r| r.order_id == order)
            .cloned())
    }

    // ── Notifications ───────────────────────────────────────────────

    async fn insert_notification(&self, record: &NotificationRecord) -> Result<(), StoreError> {
        self.tables
            .write()
            .notifications
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn notifications_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<NotificationRecord>, StoreError> {
        let mut hits: Vec<_> = self
            .tables
            .read()
            .notifications
            .values()
            .filter(|n| n.recipient == user)
            .cloned()
            .collect();
        hits.sort_by_key(|n| std::cmp::Reverse(n.created_at));
        Ok(hits)
    }

    async fn mark_notification_read(&self, user: UserId, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        match tables.notifications.get_mut(&id) {
            Some(record) if record.recipient == user => {
                record.read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
