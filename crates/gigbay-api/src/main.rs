//! # gigbay-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Postgres when `DATABASE_URL` is set,
//! in-memory otherwise; a background sweep expires stale offers.

use std::sync::Arc;

use gigbay_api::state::{AppConfig, AppState};
use gigbay_api::workflow::OfferManager;
use gigbay_store::{EngagementStore, MemoryStore, PgStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let auth_secret = std::env::var("AUTH_SECRET").ok();
    if auth_secret.is_none() {
        tracing::warn!("AUTH_SECRET not set — auth disabled, all requests run as admin");
    }
    let offer_ttl_days: i64 = std::env::var("OFFER_TTL_DAYS")
        .ok()
        .and_then(|d| d.parse().ok())
        .unwrap_or(14);

    let config = AppConfig {
        port,
        auth_secret,
        offer_ttl_days,
    };

    // Postgres when configured, in-memory otherwise.
    let store: Arc<dyn EngagementStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pg = PgStore::connect(&url).await.map_err(|e| {
                tracing::error!("database connection failed: {e}");
                e
            })?;
            pg.ensure_schema().await?;
            tracing::info!("connected to Postgres");
            Arc::new(pg)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set — using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, config);

    spawn_offer_expiry_sweep(state.clone());

    let app = gigbay_api::app(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("gigbay API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Hourly sweep marking unanswered offers expired.
fn spawn_offer_expiry_sweep(state: AppState) {
    tokio::spawn(async move {
        let manager = OfferManager::new(state.store.clone());
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            ticker.tick().await;
            match manager.expire_stale(state.config.offer_ttl_days).await {
                Ok(effects) => {
                    if !effects.is_empty() {
                        state.dispatcher.run(effects).await;
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "offer expiry sweep failed");
                }
            }
        }
    });
}
