//! # Application State
//!
//! Shared state for the Axum application: the engagement store behind its
//! trait object, the realtime hub, the effect dispatcher, and the service
//! configuration. Cloning is cheap — everything inside is an `Arc` or a
//! handle.

use std::sync::Arc;

use gigbay_store::EngagementStore;

use crate::notify::EffectDispatcher;
use crate::realtime::RealtimeHub;

/// Service configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen port.
    pub port: u16,
    /// Shared bearer secret; `None` disables auth (development mode).
    pub auth_secret: Option<String>,
    /// Days a pending offer may sit unanswered before the sweep expires it.
    pub offer_ttl_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_secret: None,
            offer_ttl_days: 14,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EngagementStore>,
    pub realtime: RealtimeHub,
    pub dispatcher: EffectDispatcher,
    pub config: AppConfig,
}

impl AppState {
    /// Assemble the state around a store implementation.
    pub fn new(store: Arc<dyn EngagementStore>, config: AppConfig) -> Self {
        let realtime = RealtimeHub::new();
        let dispatcher = EffectDispatcher::new(store.clone(), realtime.clone());
        Self {
            store,
            realtime,
            dispatcher,
            config,
        }
    }
}
