//! # Reviews
//!
//! A client's rating of a completed order. One review per order, written
//! by the order's client; the uniqueness is enforced by the store at
//! commit time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use gigbay_core::{OrderId, ReviewId, UserId, WorkflowError};

use crate::order::{Order, OrderStatus};

/// A client's review of a completed order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    #[schema(value_type = uuid::Uuid)]
    pub id: ReviewId,
    #[schema(value_type = uuid::Uuid)]
    pub order_id: OrderId,
    #[schema(value_type = uuid::Uuid)]
    pub reviewer_id: UserId,
    #[schema(value_type = uuid::Uuid)]
    pub freelancer_id: UserId,
    /// 1 (worst) to 5 (best).
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Review a completed order.
    ///
    /// Rejects with `InvalidState` unless the order is `COMPLETED`, and
    /// with `Validation` for an out-of-range rating.
    pub fn create(
        order: &Order,
        rating: u8,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        if order.status != OrderStatus::Completed {
            return Err(WorkflowError::invalid_state(
                "order",
                "leave review",
                order.status,
                "COMPLETED",
            ));
        }
        if !(1..=5).contains(&rating) {
            return Err(WorkflowError::Validation(format!(
                "rating must be between 1 and 5, got {rating}"
            )));
        }
        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(Self {
            id: ReviewId::new(),
            order_id: order.id,
            reviewer_id: order.client_id,
            freelancer_id: order.freelancer_id,
            rating,
            comment,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{DeliverableType, NewDelivery, Order};
    use crate::service::{CreateService, ServiceListing};
    use gigbay_core::Price;

    fn completed_order() -> Order {
        let mut svc = ServiceListing::create(
            CreateService {
                freelancer_id: UserId::new(),
                title: "Copywriting".into(),
                description: "500 words".into(),
                price: Price::parse("40").unwrap(),
                currency: "USD".into(),
                delivery_time_days: 2,
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
                    payload: "draft attached".into(),
                    is_revision: false,
                },
                Utc::now(),
            )
            .unwrap();
        let id = order.latest_deliverable().unwrap().id;
        order.accept_delivery(id, Utc::now()).unwrap();
        order
    }

    #[test]
    fn review_on_completed_order() {
        let order = completed_order();
        let review = Review::create(&order, 5, Some("great work".into()), Utc::now()).unwrap();
        assert_eq!(review.reviewer_id, order.client_id);
        assert_eq!(review.freelancer_id, order.freelancer_id);
        assert_eq!(review.rating, 5);
    }

    #[test]
    fn review_before_completion_rejected() {
        let mut svc = ServiceListing::create(
            CreateService {
                freelancer_id: UserId::new(),
                title: "T".into(),
                description: "D".into(),
                price: Price::parse("10").unwrap(),
                currency: "USD".into(),
                delivery_time_days: 1,
                revisions_included: 0,
            },
            Utc::now(),
        )
        .unwrap();
        svc.approve().unwrap();
        let order = Order::direct_purchase(&svc, UserId::new(), None, Utc::now()).unwrap();
        let err = Review::create(&order, 4, None, Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));
    }

    #[test]
    fn rating_must_be_in_range() {
        let order = completed_order();
        assert!(Review::create(&order, 0, None, Utc::now()).is_err());
        assert!(Review::create(&order, 6, None, Utc::now()).is_err());
    }

    #[test]
    fn blank_comment_becomes_none() {
        let order = completed_order();
        let review = Review::create(&order, 3, Some("   ".into()), Utc::now()).unwrap();
        assert!(review.comment.is_none());
    }
}
