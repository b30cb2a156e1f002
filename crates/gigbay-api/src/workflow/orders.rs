//! Order lifecycle operations: direct purchase, the seller's decision,
//! cancellation, delivery, revision, completion, and reviews. Dispute
//! opening lives in [`super::disputes`] because it creates the dependent
//! dispute entity.

use std::sync::Arc;

use chrono::Utc;

use gigbay_core::{Actor, ConversationId, DeliverableId, OrderId, ServiceId};
use gigbay_engine::{authz, effects, Effect, NewDelivery, Order, Review};
use gigbay_store::EngagementStore;

use crate::error::AppError;

pub struct OrderLifecycle {
    store: Arc<dyn EngagementStore>,
}

impl OrderLifecycle {
    pub fn new(store: Arc<dyn EngagementStore>) -> Self {
        Self { store }
    }

    /// Direct purchase of an active service; the order awaits the
    /// seller's acceptance.
    pub async fn create(
        &self,
        actor: &Actor,
        service_id: ServiceId,
        conversation_id: Option<ConversationId>,
    ) -> Result<(Order, Vec<Effect>), AppError> {
        authz::create_order(actor)?;
        let service = self
            .store
            .service(service_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("service {service_id} not found")))?;

        let order = Order::direct_purchase(&service, actor.id, conversation_id, Utc::now())?;
        self.store.insert_order(&order).await?;

        let effects = effects::order_created(&order, &actor.display_name);
        Ok((order, effects))
    }

    /// Seller takes the work on.
    pub async fn accept(
        &self,
        actor: &Actor,
        id: OrderId,
    ) -> Result<(Order, Vec<Effect>), AppError> {
        let mut order = self.fetch(id).await?;
        authz::decide_order(actor, &order, "accept order")?;

        order.accept(Utc::now())?;
        let order = self.store.update_order(&order).await?;

        let effects = effects::order_accepted(&order);
        Ok((order, effects))
    }

    /// Seller declines the work.
    pub async fn reject(
        &self,
        actor: &Actor,
        id: OrderId,
        reason: &str,
    ) -> Result<(Order, Vec<Effect>), AppError> {
        let mut order = self.fetch(id).await?;
        authz::decide_order(actor, &order, "reject order")?;

        order.reject(reason, Utc::now())?;
        let order = self.store.update_order(&order).await?;

        let effects = effects::order_rejected(&order, &actor.display_name);
        Ok((order, effects))
    }

    /// Either party backs out before delivery.
    pub async fn cancel(
        &self,
        actor: &Actor,
        id: OrderId,
        reason: &str,
    ) -> Result<(Order, Vec<Effect>), AppError> {
        let mut order = self.fetch(id).await?;
        authz::cancel_order(actor, &order)?;

        order.cancel(reason, Utc::now())?;
        let order = self.store.update_order(&order).await?;

        let effects = effects::order_cancelled(&order, actor.id, &actor.display_name);
        Ok((order, effects))
    }

    /// Seller submits work against a running order.
    pub async fn submit_delivery(
        &self,
        actor: &Actor,
        id: OrderId,
        delivery: NewDelivery,
    ) -> Result<(Order, Vec<Effect>), AppError> {
        let mut order = self.fetch(id).await?;
        authz::submit_delivery(actor, &order)?;

        let deliverable = order.submit_delivery(delivery, Utc::now())?;
        let order = self.store.update_order(&order).await?;

        let effects = effects::delivery_submitted(&order, &deliverable, &actor.display_name);
        Ok((order, effects))
    }

    /// Client sends a delivered order back for another pass.
    pub async fn request_revision(
        &self,
        actor: &Actor,
        id: OrderId,
        reason: &str,
    ) -> Result<(Order, Vec<Effect>), AppError> {
        let mut order = self.fetch(id).await?;
        authz::client_verdict(actor, &order, "request revision")?;

        order.request_revision(reason, Utc::now())?;
        let order = self.store.update_order(&order).await?;

        let effects = effects::revision_requested(&order, reason, &actor.display_name);
        Ok((order, effects))
    }

    /// Client accepts a specific deliverable; the order completes.
    pub async fn accept_delivery(
        &self,
        actor: &Actor,
        id: OrderId,
        deliverable_id: DeliverableId,
    ) -> Result<(Order, Vec<Effect>), AppError> {
        let mut order = self.fetch(id).await?;
        authz::client_verdict(actor, &order, "accept delivery")?;

        order.accept_delivery(deliverable_id, Utc::now())?;
        let order = self.store.update_order(&order).await?;

        let effects = effects::order_completed(&order, &actor.display_name);
        Ok((order, effects))
    }

    /// Fetch one order, restricted to its parties and staff.
    pub async fn get(&self, actor: &Actor, id: OrderId) -> Result<Order, AppError> {
        let order = self.fetch(id).await?;
        authz::view_order(actor, &order)?;
        Ok(order)
    }

    /// Orders where the caller is a party, newest first.
    pub async fn list_for(&self, actor: &Actor) -> Result<Vec<Order>, AppError> {
        Ok(self.store.orders_for_user(actor.id).await?)
    }

    // ── Reviews ─────────────────────────────────────────────────────

    /// Client reviews a completed order. One review per order.
    pub async fn leave_review(
        &self,
        actor: &Actor,
        id: OrderId,
        rating: u8,
        comment: Option<String>,
    ) -> Result<(Review, Vec<Effect>), AppError> {
        let order = self.fetch(id).await?;
        authz::client_verdict(actor, &order, "leave review")?;

        let review = Review::create(&order, rating, comment, Utc::now())?;
        self.store.insert_review(&review).await?;

        let effects = effects::review_submitted(&review, &order, &actor.display_name);
        Ok((review, effects))
    }

    /// The order's review, visible to whoever may view the order.
    pub async fn get_review(&self, actor: &Actor, id: OrderId) -> Result<Review, AppError> {
        let order = self.fetch(id).await?;
        authz::view_order(actor, &order)?;
        self.store
            .review_for_order(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {id} has no review")))
    }

    async fn fetch(&self, id: OrderId) -> Result<Order, AppError> {
        self.store
            .order(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))
    }
}
