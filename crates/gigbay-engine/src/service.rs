//! # Service Listings
//!
//! A service is a seller's postable listing — the thing offers and orders
//! reference. The workflow engine needs only its identity, its owner, its
//! commercial terms, and whether it is currently orderable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use gigbay_core::{Price, ServiceId, UserId, WorkflowError};

/// The publication status of a service listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    /// Submitted by the seller, awaiting marketplace approval.
    PendingApproval,
    /// Approved and orderable.
    Active,
    /// Taken down by the seller; existing orders continue.
    Paused,
}

impl ServiceStatus {
    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingApproval => "PENDING_APPROVAL",
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for posting a new service listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateService {
    pub freelancer_id: UserId,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub currency: String,
    pub delivery_time_days: u32,
    pub revisions_included: u32,
}

/// A posted service listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceListing {
    #[schema(value_type = uuid::Uuid)]
    pub id: ServiceId,
    #[schema(value_type = uuid::Uuid)]
    pub freelancer_id: UserId,
    pub title: String,
    pub description: String,
    #[schema(value_type = String)]
    pub price: Price,
    pub currency: String,
    pub delivery_time_days: u32,
    pub revisions_included: u32,
    pub status: ServiceStatus,
    pub created_at: DateTime<Utc>,
    /// Optimistic concurrency counter, managed by the store.
    pub version: u64,
}

impl ServiceListing {
    /// Post a new listing. Starts in `PENDING_APPROVAL`.
    pub fn create(input: CreateService, now: DateTime<Utc>) -> Result<Self, WorkflowError> {
        if input.title.trim().is_empty() {
            return Err(WorkflowError::Validation("title must not be empty".into()));
        }
        if input.description.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "description must not be empty".into(),
            ));
        }
        if input.currency.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "currency must not be empty".into(),
            ));
        }
        if input.delivery_time_days == 0 {
            return Err(WorkflowError::Validation(
                "delivery_time_days must be at least 1".into(),
            ));
        }

        Ok(Self {
            id: ServiceId::new(),
            freelancer_id: input.freelancer_id,
            title: input.title,
            description: input.description,
            price: input.price,
            currency: input.currency,
            delivery_time_days: input.delivery_time_days,
            revisions_included: input.revisions_included,
            status: ServiceStatus::PendingApproval,
            created_at: now,
            version: 0,
        })
    }

    /// Approve the listing (`PENDING_APPROVAL → ACTIVE`).
    pub fn approve(&mut self) -> Result<(), WorkflowError> {
        match self.status {
            ServiceStatus::PendingApproval => {
                self.status = ServiceStatus::Active;
                Ok(())
            }
            current => Err(WorkflowError::invalid_state(
                "service",
                "approve service",
                current,
                "PENDING_APPROVAL",
            )),
        }
    }

    /// Pause the listing (`ACTIVE → PAUSED`).
    pub fn pause(&mut self) -> Result<(), WorkflowError> {
        match self.status {
            ServiceStatus::Active => {
                self.status = ServiceStatus::Paused;
                Ok(())
            }
            current => Err(WorkflowError::invalid_state(
                "service",
                "pause service",
                current,
                "ACTIVE",
            )),
        }
    }

    /// Reject with `InvalidState` unless the listing is currently orderable.
    ///
    /// Consulted by offer and order creation: a pending or paused listing
    /// cannot take new engagements.
    pub fn require_orderable(&self, action: &'static str) -> Result<(), WorkflowError> {
        match self.status {
            ServiceStatus::Active => Ok(()),
            current => Err(WorkflowError::invalid_state(
                "service", action, current, "ACTIVE",
            )),
        }
    }
}
