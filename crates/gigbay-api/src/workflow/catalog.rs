//! Service-listing operations. Listings are browseable by anyone; only
//! posting, approving, and pausing are gated.

use std::sync::Arc;

use chrono::Utc;

use gigbay_core::{Actor, Price, ServiceId};
use gigbay_engine::{authz, CreateService, ServiceListing};
use gigbay_store::EngagementStore;

use crate::error::AppError;

/// Parameters for posting a listing (the seller comes from the actor).
#[derive(Debug, Clone)]
pub struct PostService {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub currency: String,
    pub delivery_time_days: u32,
    pub revisions_included: u32,
}

pub struct ServiceCatalog {
    store: Arc<dyn EngagementStore>,
}

impl ServiceCatalog {
    pub fn new(store: Arc<dyn EngagementStore>) -> Self {
        Self { store }
    }

    /// Post a listing. Starts pending approval.
    pub async fn create(
        &self,
        actor: &Actor,
        input: PostService,
    ) -> Result<ServiceListing, AppError> {
        authz::create_service(actor)?;
        let service = ServiceListing::create(
            CreateService {
                freelancer_id: actor.id,
                title: input.title,
                description: input.description,
                price: input.price,
                currency: input.currency,
                delivery_time_days: input.delivery_time_days,
                revisions_included: input.revisions_included,
            },
            Utc::now(),
        )?;
        self.store.insert_service(&service).await?;
        Ok(service)
    }

    /// Approve a pending listing (admin).
    pub async fn approve(
        &self,
        actor: &Actor,
        id: ServiceId,
    ) -> Result<ServiceListing, AppError> {
        authz::approve_service(actor)?;
        let mut service = self.fetch(id).await?;
        service.approve()?;
        Ok(self.store.update_service(&service).await?)
    }

    /// Pause an active listing (owner or admin).
    pub async fn pause(&self, actor: &Actor, id: ServiceId) -> Result<ServiceListing, AppError> {
        let mut service = self.fetch(id).await?;
        authz::pause_service(actor, &service)?;
        service.pause()?;
        Ok(self.store.update_service(&service).await?)
    }

    /// Fetch one listing. Listings are public.
    pub async fn get(&self, id: ServiceId) -> Result<ServiceListing, AppError> {
        self.fetch(id).await
    }

    /// All listings, newest first.
    pub async fn list(&self) -> Result<Vec<ServiceListing>, AppError> {
        Ok(self.store.list_services().await?)
    }

    async fn fetch(&self, id: ServiceId) -> Result<ServiceListing, AppError> {
        self.store
            .service(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("service {id} not found")))
    }
}
