//! # gigbay-api — Axum Service for the gigbay Marketplace
//!
//! The HTTP boundary over the workflow engine. Routing stays thin: every
//! handler authenticates, delegates to a workflow service, hands the
//! returned effects to the dispatcher, and serializes the entity.
//!
//! ## API Surface
//!
//! | Prefix               | Module                     | Domain                |
//! |----------------------|----------------------------|-----------------------|
//! | `/v1/services/*`     | [`routes::services`]       | Service listings      |
//! | `/v1/offers/*`       | [`routes::offers`]         | Offers                |
//! | `/v1/orders/*`       | [`routes::orders`]         | Orders + reviews      |
//! | `/v1/disputes/*`     | [`routes::disputes`]       | Disputes              |
//! | `/v1/notifications/*`| [`routes::notifications`]  | Notifications         |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```
//!
//! Health probes are mounted outside the auth middleware so they remain
//! reachable without credentials.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod notify;
pub mod openapi;
pub mod realtime;
pub mod routes;
pub mod state;
pub mod workflow;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        secret: state.config.auth_secret.clone(),
    };

    let api = Router::new()
        .merge(routes::services::router())
        .merge(routes::offers::router())
        .merge(routes::orders::router())
        .merge(routes::disputes::router())
        .merge(routes::notifications::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — 200 whenever the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 200 when the application can serve requests.
async fn readiness() -> &'static str {
    "ready"
}
