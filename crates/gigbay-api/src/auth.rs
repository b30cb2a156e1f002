//! # Authentication Middleware
//!
//! Bearer-token authentication supplying `(actor_id, role)` to every
//! workflow entry point. The workflow core trusts this input and performs
//! no credential verification itself.
//!
//! ## Token format
//!
//! ```text
//! Bearer {role}:{user_id}:{secret}
//! ```
//!
//! `role` is one of `client`, `client_seller` (a client account approved
//! to sell), `freelancer`, `agent`, `admin`. The secret is compared in
//! constant time. When no secret is configured, every request runs as an
//! admin (development mode).

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use gigbay_core::{Actor, Capabilities, Role, UserId};

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── Configuration ───────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the secret so it cannot leak through logs.
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Caller extraction ───────────────────────────────────────────────

/// The authenticated actor, extracted from request extensions.
#[derive(Debug, Clone)]
pub struct Caller(pub Actor);

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(Caller)
            .ok_or_else(|| {
                AppError::Unauthenticated("no caller identity in request context".into())
            })
    }
}

// ── Token parsing ───────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets.
///
/// When lengths differ a dummy comparison runs anyway, so the timing does
/// not reveal the expected length.
fn constant_time_secret_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Derive the display name the notification text uses for this actor.
///
/// The marketplace's profile service is outside this system, so names are
/// synthesized from the role and a short id prefix.
fn display_name(role: Role, approved_seller: bool, id: UserId) -> String {
    let hex = id.as_uuid().simple().to_string();
    let short = &hex[..6];
    if approved_seller {
        return format!("Seller {short}");
    }
    match role {
        Role::Client => format!("Client {short}"),
        Role::Freelancer => format!("Freelancer {short}"),
        Role::Agent => format!("Agent {short}"),
        Role::Admin => format!("Admin {short}"),
    }
}

/// Parse `{role}:{user_id}:{secret}` into an [`Actor`].
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<Actor, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();
    if parts.len() != 3 {
        return Err("invalid token format — expected {role}:{user_id}:{secret}".into());
    }
    let (role_str, user_str, secret) = (parts[0], parts[1], parts[2]);

    if !constant_time_secret_eq(secret, expected_secret) {
        return Err("invalid bearer token".into());
    }

    let (role, approved_seller) = match role_str {
        "client" => (Role::Client, false),
        "client_seller" => (Role::Client, true),
        "freelancer" => (Role::Freelancer, false),
        "agent" => (Role::Agent, false),
        "admin" => (Role::Admin, false),
        other => return Err(format!("unknown role: {other}")),
    };

    let id = user_str
        .parse::<Uuid>()
        .map(UserId)
        .map_err(|e| format!("invalid user_id: {e}"))?;

    Ok(Actor {
        id,
        role,
        display_name: display_name(role, approved_seller, id),
        capabilities: Capabilities::derive(role, approved_seller),
    })
}

// ── Middleware ──────────────────────────────────────────────────────

/// Validate the Authorization header and inject the [`Actor`] into
/// request extensions for downstream handlers.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let config = request.extensions().get::<AuthConfig>().cloned();

    match config {
        Some(AuthConfig {
            secret: Some(ref expected),
        }) => {
            let header_value = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match header_value {
                Some(value) if value.starts_with("Bearer ") => {
                    match parse_bearer_token(&value[7..], expected) {
                        Ok(actor) => {
                            request.extensions_mut().insert(actor);
                            next.run(request).await
                        }
                        Err(reason) => {
                            tracing::warn!(%reason, "authentication failed");
                            unauthenticated_response(&reason)
                        }
                    }
                }
                Some(_) => {
                    tracing::warn!("authentication failed: non-Bearer scheme");
                    unauthenticated_response("authorization header must use Bearer scheme")
                }
                None => {
                    tracing::warn!("authentication failed: missing authorization header");
                    unauthenticated_response("missing authorization header")
                }
            }
        }
        _ => {
            // Auth disabled: run as admin for full access.
            let id = UserId::new();
            request.extensions_mut().insert(Actor {
                id,
                role: Role::Admin,
                display_name: display_name(Role::Admin, false, id),
                capabilities: Capabilities::derive(Role::Admin, false),
            });
            next.run(request).await
        }
    }
}

fn unauthenticated_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHENTICATED".to_string(),
            message: message.to_string(),
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "s3cret";

    fn token(role: &str) -> String {
        format!("{role}:{}:{SECRET}", Uuid::new_v4())
    }

    #[test]
    fn parses_each_role() {
        let actor = parse_bearer_token(&token("client"), SECRET).unwrap();
        assert_eq!(actor.role, Role::Client);
        assert!(!actor.capabilities.can_sell);

        let actor = parse_bearer_token(&token("client_seller"), SECRET).unwrap();
        assert_eq!(actor.role, Role::Client);
        assert!(actor.capabilities.can_sell);
        assert!(actor.display_name.starts_with("Seller "));

        let actor = parse_bearer_token(&token("freelancer"), SECRET).unwrap();
        assert_eq!(actor.role, Role::Freelancer);

        let actor = parse_bearer_token(&token("admin"), SECRET).unwrap();
        assert!(actor.capabilities.is_admin);
    }

    #[test]
    fn rejects_wrong_secret() {
        let t = format!("client:{}:wrong", Uuid::new_v4());
        assert!(parse_bearer_token(&t, SECRET).is_err());
    }

    #[test]
    fn rejects_unknown_role_and_bad_uuid() {
        let t = format!("superuser:{}:{SECRET}", Uuid::new_v4());
        assert!(parse_bearer_token(&t, SECRET).is_err());
        assert!(parse_bearer_token(&format!("client:not-a-uuid:{SECRET}"), SECRET).is_err());
    }

    #[test]
    fn rejects_malformed_token() {
        assert!(parse_bearer_token("justasecret", SECRET).is_err());
        assert!(parse_bearer_token("client:missing-secret", SECRET).is_err());
    }

    #[test]
    fn debug_redacts_secret() {
        let config = AuthConfig {
            secret: Some("topsecret".into()),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("topsecret"));
        assert!(rendered.contains("REDACTED"));
    }
}
