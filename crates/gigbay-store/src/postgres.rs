//! # Postgres Store
//!
//! The production [`EngagementStore`]. All race-sensitive writes are
//! optimistic: `UPDATE … WHERE id = $n AND version = $m` inside a single
//! transaction, so the losing writer of any race observes zero affected
//! rows and fails before commit. Two schema-level constraints backstop
//! the application checks:
//!
//! - `orders.offer_id UNIQUE` — at most one order may ever reference an
//!   offer, whatever code path tries to insert it.
//! - a partial unique index on `disputes(order_id) WHERE status IN
//!   ('OPEN','IN_REVIEW')` — at most one active dispute per order.
//!
//! Status enums are stored as their `SCREAMING_SNAKE_CASE` strings and
//! parsed back through serde. A row whose status no longer parses is an
//! error, never a silent default — a state machine that "defaults" a
//! status on read corrupts itself on the next write.
//!
//! Owned append-only collections (deliverables, revision requests,
//! transition log, attachments) travel as JSONB columns on their owning
//! row, which keeps every transition a one-row write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use gigbay_core::{DisputeId, OfferId, OrderId, Price, ServiceId, UserId};
use gigbay_engine::{
    Dispute, DisputeComment, Offer, Order, Review, ServiceListing,
};

use crate::{EngagementStore, NotificationRecord, StoreError};

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(db_err)?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool (tests, shared pools).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        }
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS services (
        id UUID PRIMARY KEY,
        freelancer_id UUID NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        price NUMERIC NOT NULL,
        currency TEXT NOT NULL,
        delivery_time_days INTEGER NOT NULL,
        revisions_included INTEGER NOT NULL,
        status TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        version BIGINT NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS ix_services_freelancer ON services (freelancer_id)",
    "CREATE TABLE IF NOT EXISTS offers (
        id UUID PRIMARY KEY,
        service_id UUID NOT NULL REFERENCES services (id),
        client_id UUID NOT NULL,
        freelancer_id UUID NOT NULL,
        conversation_id UUID,
        price NUMERIC NOT NULL,
        currency TEXT NOT NULL,
        delivery_time_days INTEGER NOT NULL,
        revisions_included INTEGER NOT NULL,
        scope_of_work TEXT NOT NULL,
        cancellation_policy TEXT,
        status TEXT NOT NULL,
        rejection_reason TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        version BIGINT NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS ix_offers_client ON offers (client_id)",
    "CREATE INDEX IF NOT EXISTS ix_offers_freelancer ON offers (freelancer_id)",
    "CREATE INDEX IF NOT EXISTS ix_offers_status_created ON offers (status, created_at)",
    "CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        order_number TEXT NOT NULL UNIQUE,
        offer_id UUID UNIQUE REFERENCES offers (id),
        service_id UUID NOT NULL REFERENCES services (id),
        client_id UUID NOT NULL,
        freelancer_id UUID NOT NULL,
        conversation_id UUID,
        price NUMERIC NOT NULL,
        currency TEXT NOT NULL,
        delivery_time_days INTEGER NOT NULL,
        revisions_included INTEGER NOT NULL,
        scope_of_work TEXT NOT NULL,
        status TEXT NOT NULL,
        rejection_reason TEXT,
        cancellation_reason TEXT,
        deliverables JSONB NOT NULL DEFAULT '[]'::jsonb,
        revision_requests JSONB NOT NULL DEFAULT '[]'::jsonb,
        accepted_deliverable_id UUID,
        transitions JSONB NOT NULL DEFAULT '[]'::jsonb,
        created_at TIMESTAMPTZ NOT NULL,
        accepted_at TIMESTAMPTZ,
        completed_at TIMESTAMPTZ,
        version BIGINT NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS ix_orders_client ON orders (client_id)",
    "CREATE INDEX IF NOT EXISTS ix_orders_freelancer ON orders (freelancer_id)",
    "CREATE TABLE IF NOT EXISTS disputes (
        id UUID PRIMARY KEY,
        order_id UUID NOT NULL REFERENCES orders (id),
        client_id UUID NOT NULL,
        freelancer_id UUID NOT NULL,
        reason TEXT NOT NULL,
        description TEXT NOT NULL,
        attachments JSONB NOT NULL DEFAULT '[]'::jsonb,
        status TEXT NOT NULL,
        admin_resolution TEXT,
        outcome TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        version BIGINT NOT NULL DEFAULT 0
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_disputes_active_order
        ON disputes (order_id) WHERE status IN ('OPEN', 'IN_REVIEW')",
    "CREATE TABLE IF NOT EXISTS dispute_comments (
        id UUID PRIMARY KEY,
        dispute_id UUID NOT NULL REFERENCES disputes (id),
        user_id UUID NOT NULL,
        role TEXT NOT NULL,
        content TEXT NOT NULL,
        attachments JSONB NOT NULL DEFAULT '[]'::jsonb,
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS ix_dispute_comments_dispute
        ON dispute_comments (dispute_id, created_at)",
    "CREATE TABLE IF NOT EXISTS reviews (
        id UUID PRIMARY KEY,
        order_id UUID NOT NULL UNIQUE REFERENCES orders (id),
        reviewer_id UUID NOT NULL,
        freelancer_id UUID NOT NULL,
        rating SMALLINT NOT NULL,
        comment TEXT,
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS notifications (
        id UUID PRIMARY KEY,
        recipient UUID NOT NULL,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        category TEXT NOT NULL,
        payload JSONB NOT NULL,
        is_read BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS ix_notifications_recipient
        ON notifications (recipient, created_at)",
];

// ─── Serialization helpers ──────────────────────────────────────────

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Map an insert error, translating unique-constraint violations.
fn insert_err(e: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(ref db) = e {
        if db.code().as_deref() == Some("23505") {
            return StoreError::UniqueViolation(format!("{what}: {}", db.message()));
        }
    }
    db_err(e)
}

/// Serialize a status enum to the string stored in its `status` column.
fn enum_str<T: Serialize>(value: &T, what: &'static str) -> Result<String, StoreError> {
    let json = serde_json::to_value(value)
        .map_err(|e| StoreError::Backend(format!("failed to serialize {what}: {e}")))?;
    json.as_str().map(String::from).ok_or_else(|| {
        StoreError::Backend(format!("{what} did not serialize to a string"))
    })
}

/// Parse a status enum back from its stored string. Unknown values are
/// errors, never defaults.
fn parse_enum<T: DeserializeOwned>(s: &str, what: &'static str) -> Result<T, StoreError> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(|e| {
        tracing::error!(value = %s, error = %e, "unknown {what} in database");
        StoreError::Backend(format!("unknown {what} in database: {s:?}"))
    })
}

fn to_json<T: Serialize>(value: &T, what: &'static str) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value)
        .map_err(|e| StoreError::Backend(format!("failed to serialize {what}: {e}")))
}

fn from_json<T: DeserializeOwned>(
    value: serde_json::Value,
    what: &'static str,
) -> Result<T, StoreError> {
    serde_json::from_value(value)
        .map_err(|e| StoreError::Backend(format!("failed to deserialize {what}: {e}")))
}

fn parse_price(amount: Decimal) -> Result<Price, StoreError> {
    Price::new(amount).map_err(|e| StoreError::Backend(format!("stored price invalid: {e}")))
}

// ─── Row types ──────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: Uuid,
    freelancer_id: Uuid,
    title: String,
    description: String,
    price: Decimal,
    currency: String,
    delivery_time_days: i32,
    revisions_included: i32,
    status: String,
    created_at: DateTime<Utc>,
    version: i64,
}

impl ServiceRow {
    fn into_domain(self) -> Result<ServiceListing, StoreError> {
        Ok(ServiceListing {
            id: ServiceId(self.id),
            freelancer_id: UserId(self.freelancer_id),
            title: self.title,
            description: self.description,
            price: parse_price(self.price)?,
            currency: self.currency,
            delivery_time_days: self.delivery_time_days as u32,
            revisions_included: self.revisions_included as u32,
            status: parse_enum(&self.status, "service status")?,
            created_at: self.created_at,
            version: self.version as u64,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OfferRow {
    id: Uuid,
    service_id: Uuid,
    client_id: Uuid,
    freelancer_id: Uuid,
    conversation_id: Option<Uuid>,
    price: Decimal,
    currency: String,
    delivery_time_days: i32,
    revisions_included: i32,
    scope_of_work: String,
    cancellation_policy: Option<String>,
    status: String,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    version: i64,
}

impl OfferRow {
    fn into_domain(self) -> Result<Offer, StoreError> {
        Ok(Offer {
            id: OfferId(self.id),
            service_id: ServiceId(self.service_id),
            client_id: UserId(self.client_id),
            freelancer_id: UserId(self.freelancer_id),
            conversation_id: self.conversation_id.map(gigbay_core::ConversationId),
            price: parse_price(self.price)?,
            currency: self.currency,
            delivery_time_days: self.delivery_time_days as u32,
            revisions_included: self.revisions_included as u32,
            scope_of_work: self.scope_of_work,
            cancellation_policy: self.cancellation_policy,
            status: parse_enum(&self.status, "offer status")?,
            rejection_reason: self.rejection_reason,
            created_at: self.created_at,
            version: self.version as u64,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    offer_id: Option<Uuid>,
    service_id: Uuid,
    client_id: Uuid,
    freelancer_id: Uuid,
    conversation_id: Option<Uuid>,
    price: Decimal,
    currency: String,
    delivery_time_days: i32,
    revisions_included: i32,
    scope_of_work: String,
    status: String,
    rejection_reason: Option<String>,
    cancellation_reason: Option<String>,
    deliverables: serde_json::Value,
    revision_requests: serde_json::Value,
    accepted_deliverable_id: Option<Uuid>,
    transitions: serde_json::Value,
    created_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    version: i64,
}

impl OrderRow {
    fn into_domain(self) -> Result<Order, StoreError> {
        Ok(Order {
            id: OrderId(self.id),
            order_number: self.order_number,
            offer_id: self.offer_id.map(OfferId),
            service_id: ServiceId(self.service_id),
            client_id: UserId(self.client_id),
            freelancer_id: UserId(self.freelancer_id),
            conversation_id: self.conversation_id.map(gigbay_core::ConversationId),
            price: parse_price(self.price)?,
            currency: self.currency,
            delivery_time_days: self.delivery_time_days as u32,
            revisions_included: self.revisions_included as u32,
            scope_of_work: self.scope_of_work,
            status: parse_enum(&self.status, "order status")?,
            rejection_reason: self.rejection_reason,
            cancellation_reason: self.cancellation_reason,
            deliverables: from_json(self.deliverables, "order deliverables")?,
            revision_requests: from_json(self.revision_requests, "order revision requests")?,
            accepted_deliverable_id: self.accepted_deliverable_id.map(gigbay_core::DeliverableId),
            transitions: from_json(self.transitions, "order transition log")?,
            created_at: self.created_at,
            accepted_at: self.accepted_at,
            completed_at: self.completed_at,
            version: self.version as u64,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DisputeRow {
    id: Uuid,
    order_id: Uuid,
    client_id: Uuid,
    freelancer_id: Uuid,
    reason: String,
    description: String,
    attachments: serde_json::Value,
    status: String,
    admin_resolution: Option<String>,
    outcome: Option<String>,
    created_at: DateTime<Utc>,
    version: i64,
}

impl DisputeRow {
    fn into_domain(self) -> Result<Dispute, StoreError> {
        Ok(Dispute {
            id: DisputeId(self.id),
            order_id: OrderId(self.order_id),
            client_id: UserId(self.client_id),
            freelancer_id: UserId(self.freelancer_id),
            reason: self.reason,
            description: self.description,
            attachments: from_json(self.attachments, "dispute attachments")?,
            status: parse_enum(&self.status, "dispute status")?,
            admin_resolution: self.admin_resolution,
            outcome: self
                .outcome
                .as_deref()
                .map(|s| parse_enum(s, "dispute outcome"))
                .transpose()?,
            created_at: self.created_at,
            version: self.version as u64,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    dispute_id: Uuid,
    user_id: Uuid,
    role: String,
    content: String,
    attachments: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_domain(self) -> Result<DisputeComment, StoreError> {
        Ok(DisputeComment {
            id: gigbay_core::CommentId(self.id),
            dispute_id: DisputeId(self.dispute_id),
            user_id: UserId(self.user_id),
            role: parse_enum(&self.role, "comment role")?,
            content: self.content,
            attachments: from_json(self.attachments, "comment attachments")?,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    order_id: Uuid,
    reviewer_id: Uuid,
    freelancer_id: Uuid,
    rating: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_domain(self) -> Review {
        Review {
            id: gigbay_core::ReviewId(self.id),
            order_id: OrderId(self.order_id),
            reviewer_id: UserId(self.reviewer_id),
            freelancer_id: UserId(self.freelancer_id),
            rating: self.rating as u8,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient: Uuid,
    title: String,
    body: String,
    category: String,
    payload: serde_json::Value,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    fn into_domain(self) -> Result<NotificationRecord, StoreError> {
        Ok(NotificationRecord {
            id: self.id,
            recipient: UserId(self.recipient),
            title: self.title,
            body: self.body,
            category: parse_enum(&self.category, "notification category")?,
            payload: self.payload,
            read: self.is_read,
            created_at: self.created_at,
        })
    }
}

// ─── Write helpers ──────────────────────────────────────────────────

const OFFER_COLUMNS: &str = "id, service_id, client_id, freelancer_id, conversation_id, price, \
     currency, delivery_time_days, revisions_included, scope_of_work, cancellation_policy, \
     status, rejection_reason, created_at, version";

const ORDER_COLUMNS: &str = "id, order_number, offer_id, service_id, client_id, freelancer_id, \
     conversation_id, price, currency, delivery_time_days, revisions_included, scope_of_work, \
     status, rejection_reason, cancellation_reason, deliverables, revision_requests, \
     accepted_deliverable_id, transitions, created_at, accepted_at, completed_at, version";

const DISPUTE_COLUMNS: &str = "id, order_id, client_id, freelancer_id, reason, description, \
     attachments, status, admin_resolution, outcome, created_at, version";

async fn insert_order_tx(
    tx: &mut Transaction<'_, Postgres>,
    order: &Order,
) -> Result<(), StoreError> {
    let status = enum_str(&order.status, "order status")?;
    sqlx::query(
        "INSERT INTO orders (id, order_number, offer_id, service_id, client_id, freelancer_id, \
         conversation_id, price, currency, delivery_time_days, revisions_included, scope_of_work, \
         status, rejection_reason, cancellation_reason, deliverables, revision_requests, \
         accepted_deliverable_id, transitions, created_at, accepted_at, completed_at, version)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
         $18, $19, $20, $21, $22, $23)",
    )
    .bind(order.id.as_uuid())
    .bind(&order.order_number)
    .bind(order.offer_id.map(|o| *o.as_uuid()))
    .bind(order.service_id.as_uuid())
    .bind(order.client_id.as_uuid())
    .bind(order.freelancer_id.as_uuid())
    .bind(order.conversation_id.map(|c| *c.as_uuid()))
    .bind(order.price.amount())
    .bind(&order.currency)
    .bind(order.delivery_time_days as i32)
    .bind(order.revisions_included as i32)
    .bind(&order.scope_of_work)
    .bind(&status)
    .bind(&order.rejection_reason)
    .bind(&order.cancellation_reason)
    .bind(to_json(&order.deliverables, "order deliverables")?)
    .bind(to_json(&order.revision_requests, "order revision requests")?)
    .bind(order.accepted_deliverable_id.map(|d| *d.as_uuid()))
    .bind(to_json(&order.transitions, "order transition log")?)
    .bind(order.created_at)
    .bind(order.accepted_at)
    .bind(order.completed_at)
    .bind(order.version as i64)
    .execute(&mut **tx)
    .await
    .map_err(|e| insert_err(e, "order insert"))?;
    Ok(())
}

async fn update_order_tx(
    tx: &mut Transaction<'_, Postgres>,
    order: &Order,
) -> Result<(), StoreError> {
    let status = enum_str(&order.status, "order status")?;
    let result = sqlx::query(
        "UPDATE orders SET status = $1, rejection_reason = $2, cancellation_reason = $3, \
         deliverables = $4, revision_requests = $5, accepted_deliverable_id = $6, \
         transitions = $7, accepted_at = $8, completed_at = $9, version = version + 1
         WHERE id = $10 AND version = $11",
    )
    .bind(&status)
    .bind(&order.rejection_reason)
    .bind(&order.cancellation_reason)
    .bind(to_json(&order.deliverables, "order deliverables")?)
    .bind(to_json(&order.revision_requests, "order revision requests")?)
    .bind(order.accepted_deliverable_id.map(|d| *d.as_uuid()))
    .bind(to_json(&order.transitions, "order transition log")?)
    .bind(order.accepted_at)
    .bind(order.completed_at)
    .bind(order.id.as_uuid())
    .bind(order.version as i64)
    .execute(&mut **tx)
    .await
    .map_err(db_err)?;

    if result.rows_affected() == 0 {
        return Err(StoreError::version_conflict("order", order.id));
    }
    Ok(())
}

async fn update_dispute_tx(
    tx: &mut Transaction<'_, Postgres>,
    dispute: &Dispute,
) -> Result<(), StoreError> {
    let status = enum_str(&dispute.status, "dispute status")?;
    let outcome = dispute
        .outcome
        .as_ref()
        .map(|o| enum_str(o, "dispute outcome"))
        .transpose()?;
    let result = sqlx::query(
        "UPDATE disputes SET status = $1, admin_resolution = $2, outcome = $3, \
         version = version + 1 WHERE id = $4 AND version = $5",
    )
    .bind(&status)
    .bind(&dispute.admin_resolution)
    .bind(&outcome)
    .bind(dispute.id.as_uuid())
    .bind(dispute.version as i64)
    .execute(&mut **tx)
    .await
    .map_err(db_err)?;

    if result.rows_affected() == 0 {
        return Err(StoreError::version_conflict("dispute", dispute.id));
    }
    Ok(())
}

/// A committed record with its version advanced past the guard.
fn bumped<T, F: FnOnce(&mut T)>(record: &T, advance: F) -> T
where
    T: Clone,
{
    let mut copy = record.clone();
    advance(&mut copy);
    copy
}

// ─── Store implementation ───────────────────────────────────────────

#[async_trait]
impl EngagementStore for PgStore {
    // ── Services ────────────────────────────────────────────────────

    async fn insert_service(&self, service: &ServiceListing) -> Result<(), StoreError> {
        let status = enum_str(&service.status, "service status")?;
        sqlx::query(
            "INSERT INTO services (id, freelancer_id, title, description, price, currency, \
             delivery_time_days, revisions_included, status, created_at, version)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(service.id.as_uuid())
        .bind(service.freelancer_id.as_uuid())
        .bind(&service.title)
        .bind(&service.description)
        .bind(service.price.amount())
        .bind(&service.currency)
        .bind(service.delivery_time_days as i32)
        .bind(service.revisions_included as i32)
        .bind(&status)
        .bind(service.created_at)
        .bind(service.version as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_err(e, "service insert"))?;
        Ok(())
    }

    async fn service(&self, id: ServiceId) -> Result<Option<ServiceListing>, StoreError> {
        sqlx::query_as::<_, ServiceRow>("SELECT * FROM services WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .map(ServiceRow::into_domain)
            .transpose()
    }

    async fn list_services(&self) -> Result<Vec<ServiceListing>, StoreError> {
        sqlx::query_as::<_, ServiceRow>("SELECT * FROM services ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(ServiceRow::into_domain)
            .collect()
    }

    async fn update_service(
        &self,
        service: &ServiceListing,
    ) -> Result<ServiceListing, StoreError> {
        let status = enum_str(&service.status, "service status")?;
        let result = sqlx::query(
            "UPDATE services SET status = $1, version = version + 1
             WHERE id = $2 AND version = $3",
        )
        .bind(&status)
        .bind(service.id.as_uuid())
        .bind(service.version as i64)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::version_conflict("service", service.id));
        }
        Ok(bumped(service, |s| s.version += 1))
    }

    // ── Offers ──────────────────────────────────────────────────────

    async fn insert_offer(&self, offer: &Offer) -> Result<(), StoreError> {
        let status = enum_str(&offer.status, "offer status")?;
        sqlx::query(
            "INSERT INTO offers (id, service_id, client_id, freelancer_id, conversation_id, \
             price, currency, delivery_time_days, revisions_included, scope_of_work, \
             cancellation_policy, status, rejection_reason, created_at, version)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(offer.id.as_uuid())
        .bind(offer.service_id.as_uuid())
        .bind(offer.client_id.as_uuid())
        .bind(offer.freelancer_id.as_uuid())
        .bind(offer.conversation_id.map(|c| *c.as_uuid()))
        .bind(offer.price.amount())
        .bind(&offer.currency)
        .bind(offer.delivery_time_days as i32)
        .bind(offer.revisions_included as i32)
        .bind(&offer.scope_of_work)
        .bind(&offer.cancellation_policy)
        .bind(&status)
        .bind(&offer.rejection_reason)
        .bind(offer.created_at)
        .bind(offer.version as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_err(e, "offer insert"))?;
        Ok(())
    }

    async fn offer(&self, id: OfferId) -> Result<Option<Offer>, StoreError> {
        sqlx::query_as::<_, OfferRow>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(OfferRow::into_domain)
        .transpose()
    }

    async fn offers_for_user(&self, user: UserId) -> Result<Vec<Offer>, StoreError> {
        sqlx::query_as::<_, OfferRow>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers
             WHERE client_id = $1 OR freelancer_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(OfferRow::into_domain)
        .collect()
    }

    async fn update_offer(&self, offer: &Offer) -> Result<Offer, StoreError> {
        let status = enum_str(&offer.status, "offer status")?;
        let result = sqlx::query(
            "UPDATE offers SET status = $1, rejection_reason = $2, version = version + 1
             WHERE id = $3 AND version = $4",
        )
        .bind(&status)
        .bind(&offer.rejection_reason)
        .bind(offer.id.as_uuid())
        .bind(offer.version as i64)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::version_conflict("offer", offer.id));
        }
        Ok(bumped(offer, |o| o.version += 1))
    }

    async fn stale_pending_offers(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Offer>, StoreError> {
        sqlx::query_as::<_, OfferRow>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers
             WHERE status = 'PENDING' AND created_at < $1"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(OfferRow::into_domain)
        .collect()
    }

    async fn commit_offer_acceptance(
        &self,
        offer: &Offer,
        order: &Order,
    ) -> Result<(Offer, Order), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let status = enum_str(&offer.status, "offer status")?;
        let result = sqlx::query(
            "UPDATE offers SET status = $1, version = version + 1
             WHERE id = $2 AND version = $3",
        )
        .bind(&status)
        .bind(offer.id.as_uuid())
        .bind(offer.version as i64)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        if result.rows_affected() == 0 {
            // The racing accept (or a reject) advanced the offer first.
            return Err(StoreError::version_conflict("offer", offer.id));
        }

        insert_order_tx(&mut tx, order).await?;
        tx.commit().await.map_err(db_err)?;

        Ok((bumped(offer, |o| o.version += 1), order.clone()))
    }

    // ── Orders ──────────────────────────────────────────────────────

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        insert_order_tx(&mut tx, order).await?;
        tx.commit().await.map_err(db_err)
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(OrderRow::into_domain)
        .transpose()
    }

    async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>, StoreError> {
        sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE client_id = $1 OR freelancer_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(OrderRow::into_domain)
        .collect()
    }

    async fn update_order(&self, order: &Order) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        update_order_tx(&mut tx, order).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(bumped(order, |o| o.version += 1))
    }

    async fn commit_dispute_open(
        &self,
        order: &Order,
        dispute: &Dispute,
    ) -> Result<(Order, Dispute), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        update_order_tx(&mut tx, order).await?;

        let status = enum_str(&dispute.status, "dispute status")?;
        let outcome = dispute
            .outcome
            .as_ref()
            .map(|o| enum_str(o, "dispute outcome"))
            .transpose()?;
        sqlx::query(&format!(
            "INSERT INTO disputes ({DISPUTE_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(dispute.id.as_uuid())
        .bind(dispute.order_id.as_uuid())
        .bind(dispute.client_id.as_uuid())
        .bind(dispute.freelancer_id.as_uuid())
        .bind(&dispute.reason)
        .bind(&dispute.description)
        .bind(to_json(&dispute.attachments, "dispute attachments")?)
        .bind(&status)
        .bind(&dispute.admin_resolution)
        .bind(&outcome)
        .bind(dispute.created_at)
        .bind(dispute.version as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| insert_err(e, "an active dispute already exists for this order"))?;

        tx.commit().await.map_err(db_err)?;
        Ok((bumped(order, |o| o.version += 1), dispute.clone()))
    }

    async fn commit_dispute_settlement(
        &self,
        dispute: &Dispute,
        order: &Order,
    ) -> Result<(Dispute, Order), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        update_dispute_tx(&mut tx, dispute).await?;
        update_order_tx(&mut tx, order).await?;
        tx.commit().await.map_err(db_err)?;
        Ok((
            bumped(dispute, |d| d.version += 1),
            bumped(order, |o| o.version += 1),
        ))
    }

    // ── Disputes ────────────────────────────────────────────────────

    async fn dispute(&self, id: DisputeId) -> Result<Option<Dispute>, StoreError> {
        sqlx::query_as::<_, DisputeRow>(&format!(
            "SELECT {DISPUTE_COLUMNS} FROM disputes WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(DisputeRow::into_domain)
        .transpose()
    }

    async fn active_dispute_for_order(
        &self,
        order: OrderId,
    ) -> Result<Option<Dispute>, StoreError> {
        sqlx::query_as::<_, DisputeRow>(&format!(
            "SELECT {DISPUTE_COLUMNS} FROM disputes
             WHERE order_id = $1 AND status IN ('OPEN', 'IN_REVIEW')"
        ))
        .bind(order.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(DisputeRow::into_domain)
        .transpose()
    }

    async fn update_dispute(&self, dispute: &Dispute) -> Result<Dispute, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        update_dispute_tx(&mut tx, dispute).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(bumped(dispute, |d| d.version += 1))
    }

    async fn insert_dispute_comment(&self, comment: &DisputeComment) -> Result<(), StoreError> {
        let role = enum_str(&comment.role, "comment role")?;
        // Conditional insert: the thread-freeze check happens in the same
        // statement, so a dispute resolved after the caller's read cannot
        // gain a late comment.
        let result = sqlx::query(
            "INSERT INTO dispute_comments (id, dispute_id, user_id, role, content, attachments, \
             created_at)
             SELECT $1::uuid, $2::uuid, $3::uuid, $4::text, $5::text, $6::jsonb, $7::timestamptz
             WHERE EXISTS (
                 SELECT 1 FROM disputes WHERE id = $2 AND status IN ('OPEN', 'IN_REVIEW')
             )",
        )
        .bind(comment.id.as_uuid())
        .bind(comment.dispute_id.as_uuid())
        .bind(comment.user_id.as_uuid())
        .bind(&role)
        .bind(&comment.content)
        .bind(to_json(&comment.attachments, "comment attachments")?)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::version_conflict("dispute", comment.dispute_id));
        }
        Ok(())
    }

    async fn dispute_comments(
        &self,
        dispute: DisputeId,
    ) -> Result<Vec<DisputeComment>, StoreError> {
        sqlx::query_as::<_, CommentRow>(
            "SELECT id, dispute_id, user_id, role, content, attachments, created_at
             FROM dispute_comments WHERE dispute_id = $1 ORDER BY created_at",
        )
        .bind(dispute.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(CommentRow::into_domain)
        .collect()
    }

    // ── Reviews ─────────────────────────────────────────────────────

    async fn insert_review(&self, review: &Review) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO reviews (id, order_id, reviewer_id, freelancer_id, rating, comment, \
             created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(review.id.as_uuid())
        .bind(review.order_id.as_uuid())
        .bind(review.reviewer_id.as_uuid())
        .bind(review.freelancer_id.as_uuid())
        .bind(review.rating as i16)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_err(e, "this order already has a review"))?;
        Ok(())
    }

    async fn review_for_order(&self, order: OrderId) -> Result<Option<Review>, StoreError> {
        Ok(sqlx::query_as::<_, ReviewRow>(
            "SELECT id, order_id, reviewer_id, freelancer_id, rating, comment, created_at
             FROM reviews WHERE order_id = $1",
        )
        .bind(order.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .map(ReviewRow::into_domain))
    }

    // ── Notifications ───────────────────────────────────────────────

    async fn insert_notification(&self, record: &NotificationRecord) -> Result<(), StoreError> {
        let category = enum_str(&record.category, "notification category")?;
        sqlx::query(
            "INSERT INTO notifications (id, recipient, title, body, category, payload, is_read, \
             created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(record.id)
        .bind(record.recipient.as_uuid())
        .bind(&record.title)
        .bind(&record.body)
        .bind(&category)
        .bind(&record.payload)
        .bind(record.read)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_err(e, "notification insert"))?;
        Ok(())
    }

    async fn notifications_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<NotificationRecord>, StoreError> {
        sqlx::query_as::<_, NotificationRow>(
            "SELECT id, recipient, title, body, category, payload, is_read, created_at
             FROM notifications WHERE recipient = $1 ORDER BY created_at DESC",
        )
        .bind(user.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(NotificationRow::into_domain)
        .collect()
    }

    async fn mark_notification_read(&self, user: UserId, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND recipient = $2",
        )
        .bind(id)
        .bind(user.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}
