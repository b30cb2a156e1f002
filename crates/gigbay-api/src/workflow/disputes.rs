//! Dispute operations: opening (with the order flip in one commit), the
//! comment thread, review, admin resolution, and client withdrawal.

use std::sync::Arc;

use chrono::Utc;

use gigbay_core::{Actor, DisputeId, OrderId};
use gigbay_engine::{
    authz, effects, Dispute, DisputeComment, DisputeOutcome, Effect, OpenDispute, Order,
};
use gigbay_store::EngagementStore;

use crate::error::AppError;

pub struct DisputeService {
    store: Arc<dyn EngagementStore>,
}

impl DisputeService {
    pub fn new(store: Arc<dyn EngagementStore>) -> Self {
        Self { store }
    }

    /// Open a dispute against a delivered order. The dispute row and the
    /// order's move to `DISPUTED` are one commit; a second active dispute
    /// is rejected by the store whichever request loses the race.
    pub async fn open(
        &self,
        actor: &Actor,
        order_id: OrderId,
        input: OpenDispute,
    ) -> Result<(Dispute, Order, Vec<Effect>), AppError> {
        let mut order = self.fetch_order(order_id).await?;
        authz::client_verdict(actor, &order, "open dispute")?;

        if self.store.active_dispute_for_order(order_id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "an active dispute already exists for order {order_id}"
            )));
        }

        let dispute = Dispute::open(&order, input, Utc::now())?;
        order.mark_disputed(Utc::now())?;
        let (order, dispute) = self.store.commit_dispute_open(&order, &dispute).await?;

        let effects = effects::dispute_opened(&order, &dispute, &actor.display_name);
        Ok((dispute, order, effects))
    }

    /// Append a comment to an active dispute's thread.
    pub async fn add_comment(
        &self,
        actor: &Actor,
        dispute_id: DisputeId,
        content: &str,
        attachments: Vec<String>,
    ) -> Result<(DisputeComment, Vec<Effect>), AppError> {
        let dispute = self.fetch(dispute_id).await?;
        authz::comment_on_dispute(actor, &dispute)?;

        let comment = DisputeComment::create(&dispute, actor, content, attachments, Utc::now())?;
        self.store.insert_dispute_comment(&comment).await?;

        let effects = effects::dispute_comment_added(&dispute, &comment);
        Ok((comment, effects))
    }

    /// The dispute's thread, oldest first.
    pub async fn comments(
        &self,
        actor: &Actor,
        dispute_id: DisputeId,
    ) -> Result<Vec<DisputeComment>, AppError> {
        let dispute = self.fetch(dispute_id).await?;
        authz::view_dispute(actor, &dispute)?;
        Ok(self.store.dispute_comments(dispute_id).await?)
    }

    /// Fetch one dispute, restricted to its parties and staff. An
    /// unauthorized viewer learns the dispute exists but nothing more.
    pub async fn get(&self, actor: &Actor, dispute_id: DisputeId) -> Result<Dispute, AppError> {
        let dispute = self.fetch(dispute_id).await?;
        authz::view_dispute(actor, &dispute)?;
        Ok(dispute)
    }

    /// Admin takes the dispute into review.
    pub async fn begin_review(
        &self,
        actor: &Actor,
        dispute_id: DisputeId,
    ) -> Result<(Dispute, Vec<Effect>), AppError> {
        authz::resolve_dispute(actor)?;
        let mut dispute = self.fetch(dispute_id).await?;

        dispute.begin_review()?;
        let dispute = self.store.update_dispute(&dispute).await?;

        let effects = effects::dispute_review_started(&dispute);
        Ok((dispute, effects))
    }

    /// Admin resolution: records the written resolution, applies the
    /// outcome to the order, and commits both in one unit.
    pub async fn resolve(
        &self,
        actor: &Actor,
        dispute_id: DisputeId,
        resolution: &str,
        outcome: DisputeOutcome,
    ) -> Result<(Dispute, Order, Vec<Effect>), AppError> {
        authz::resolve_dispute(actor)?;
        let mut dispute = self.fetch(dispute_id).await?;
        let mut order = self.fetch_order(dispute.order_id).await?;

        dispute.resolve(resolution, outcome)?;
        order.apply_dispute_outcome(outcome, Utc::now())?;
        let (dispute, order) = self
            .store
            .commit_dispute_settlement(&dispute, &order)
            .await?;

        let effects = effects::dispute_resolved(&dispute, &order);
        Ok((dispute, order, effects))
    }

    /// Client withdrawal: the dispute closes and the order returns to
    /// `DELIVERED`, awaiting the client's verdict on the existing work.
    pub async fn withdraw(
        &self,
        actor: &Actor,
        dispute_id: DisputeId,
    ) -> Result<(Dispute, Order, Vec<Effect>), AppError> {
        let mut dispute = self.fetch(dispute_id).await?;
        authz::withdraw_dispute(actor, &dispute)?;
        let mut order = self.fetch_order(dispute.order_id).await?;

        dispute.close()?;
        order.release_from_dispute(Utc::now())?;
        let (dispute, order) = self
            .store
            .commit_dispute_settlement(&dispute, &order)
            .await?;

        let effects = effects::dispute_withdrawn(&dispute, &order, &actor.display_name);
        Ok((dispute, order, effects))
    }

    async fn fetch(&self, id: DisputeId) -> Result<Dispute, AppError> {
        self.store
            .dispute(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("dispute {id} not found")))
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Order, AppError> {
        self.store
            .order(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))
    }
}
