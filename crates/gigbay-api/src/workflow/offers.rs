//! Offer operations: creation, the atomic accept-into-order, rejection,
//! reads, and the expiry sweep. This module is the sole producer of
//! orders from offers — acceptance and order creation are one store
//! commit, never two calls a caller could interleave.

use std::sync::Arc;

use chrono::Utc;

use gigbay_core::{Actor, OfferId, ServiceId};
use gigbay_engine::{authz, effects, CreateOffer, Effect, Offer, Order};
use gigbay_store::{EngagementStore, StoreError};

use crate::error::AppError;

pub struct OfferManager {
    store: Arc<dyn EngagementStore>,
}

impl OfferManager {
    pub fn new(store: Arc<dyn EngagementStore>) -> Self {
        Self { store }
    }

    /// Create an offer against the actor's active service.
    pub async fn create(
        &self,
        actor: &Actor,
        service_id: ServiceId,
        input: CreateOffer,
    ) -> Result<(Offer, Vec<Effect>), AppError> {
        let service = self
            .store
            .service(service_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("service {service_id} not found")))?;
        authz::create_offer(actor, &service)?;

        let offer = Offer::create(&service, input, Utc::now())?;
        self.store.insert_offer(&offer).await?;

        let effects = effects::offer_created(&offer, &actor.display_name);
        Ok((offer, effects))
    }

    /// Accept a pending offer, creating its order in the same atomic
    /// unit. Exactly one caller can win this for a given offer; every
    /// other concurrent accept observes a conflict.
    pub async fn accept(
        &self,
        actor: &Actor,
        id: OfferId,
    ) -> Result<(Offer, Order, Vec<Effect>), AppError> {
        let mut offer = self.fetch(id).await?;
        authz::decide_offer(actor, &offer, "accept offer")?;

        let order = offer.accept_into_order(Utc::now())?;
        let (offer, order) = self.store.commit_offer_acceptance(&offer, &order).await?;

        let effects = effects::offer_accepted(&offer, &order, &actor.display_name);
        Ok((offer, order, effects))
    }

    /// Reject a pending offer with a reason. No order is created.
    pub async fn reject(
        &self,
        actor: &Actor,
        id: OfferId,
        reason: &str,
    ) -> Result<(Offer, Vec<Effect>), AppError> {
        let mut offer = self.fetch(id).await?;
        authz::decide_offer(actor, &offer, "reject offer")?;

        offer.reject(reason, Utc::now())?;
        let offer = self.store.update_offer(&offer).await?;

        let effects = effects::offer_rejected(&offer, &actor.display_name);
        Ok((offer, effects))
    }

    /// Fetch one offer, restricted to its parties and staff.
    pub async fn get(&self, actor: &Actor, id: OfferId) -> Result<Offer, AppError> {
        let offer = self.fetch(id).await?;
        authz::view_offer(actor, &offer)?;
        Ok(offer)
    }

    /// Offers where the caller is a party, newest first.
    pub async fn list_for(&self, actor: &Actor) -> Result<Vec<Offer>, AppError> {
        Ok(self.store.offers_for_user(actor.id).await?)
    }

    /// Expire pending offers older than `ttl_days`. Returns the effects
    /// to dispatch for the offers this sweep actually transitioned; an
    /// offer that raced a concurrent decision is skipped.
    pub async fn expire_stale(&self, ttl_days: i64) -> Result<Vec<Effect>, AppError> {
        let cutoff = Utc::now() - chrono::Duration::days(ttl_days);
        let stale = self.store.stale_pending_offers(cutoff).await?;

        let mut effects = Vec::new();
        for mut offer in stale {
            offer.expire()?;
            match self.store.update_offer(&offer).await {
                Ok(offer) => effects.extend(effects::offer_expired(&offer)),
                Err(StoreError::VersionConflict { .. }) => {
                    tracing::debug!(offer = %offer.id, "offer decided during expiry sweep; skipping");
                }
                Err(other) => return Err(other.into()),
            }
        }
        Ok(effects)
    }

    async fn fetch(&self, id: OfferId) -> Result<Offer, AppError> {
        self.store
            .offer(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("offer {id} not found")))
    }
}
