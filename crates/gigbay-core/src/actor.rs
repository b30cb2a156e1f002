//! # Actor & Capability Model
//!
//! Every workflow entry point receives an [`Actor`]: the authenticated
//! caller's identity, role, and derived [`Capabilities`].
//!
//! ## Design
//!
//! A user's ability to act is NOT the raw role enum. A client account may
//! be an approved seller, an admin may act on behalf of either party. To
//! keep those combinations out of the call sites, capabilities are derived
//! **once** when the actor is constructed, and the authorization matrix
//! consumes only the derived tags. No call site ever inspects
//! `role == Client && approved_seller` itself.

use serde::{Deserialize, Serialize};

use crate::identity::UserId;

// ── Role ────────────────────────────────────────────────────────────

/// Roles in the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Buys services; opens orders, revisions, and disputes.
    Client,
    /// Sells services; creates offers and submits deliveries.
    Freelancer,
    /// Support staff; may read and comment on disputes.
    Agent,
    /// Superuser for every check in the system.
    Admin,
}

impl Role {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Freelancer => "freelancer",
            Self::Agent => "agent",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Capabilities ────────────────────────────────────────────────────

/// Derived capability tags consumed by the authorization matrix.
///
/// Computed once per actor from the role plus the approved-seller flag.
/// The closed set keeps role/flag duck-typing out of transition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// May purchase services and act as an order's client.
    pub can_buy: bool,
    /// May post services, create offers, and deliver work.
    pub can_sell: bool,
    /// May participate in dispute threads without being a party.
    pub is_agent: bool,
    /// Bypasses ownership checks everywhere.
    pub is_admin: bool,
}

impl Capabilities {
    /// Derive the capability set for a role.
    ///
    /// `approved_seller` marks a client account that has been approved to
    /// sell; it widens a client's capabilities and is meaningless for the
    /// other roles.
    pub fn derive(role: Role, approved_seller: bool) -> Self {
        match role {
            Role::Client => Self {
                can_buy: true,
                can_sell: approved_seller,
                is_agent: false,
                is_admin: false,
            },
            Role::Freelancer => Self {
                can_buy: false,
                can_sell: true,
                is_agent: false,
                is_admin: false,
            },
            Role::Agent => Self {
                can_buy: false,
                can_sell: false,
                is_agent: true,
                is_admin: false,
            },
            Role::Admin => Self {
                can_buy: true,
                can_sell: true,
                is_agent: true,
                is_admin: true,
            },
        }
    }
}

// ── Actor ───────────────────────────────────────────────────────────

/// The authenticated caller of a workflow operation.
///
/// Supplied by the authentication layer; the workflow core trusts it and
/// performs no credential verification of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The caller's user identifier.
    pub id: UserId,
    /// The caller's declared role.
    pub role: Role,
    /// Human-readable name used in notification text.
    pub display_name: String,
    /// Capability tags derived from role + account flags.
    pub capabilities: Capabilities,
}

impl Actor {
    /// Construct an actor, deriving capabilities from the role.
    pub fn new(id: UserId, role: Role, display_name: impl Into<String>) -> Self {
        Self {
            id,
            role,
            display_name: display_name.into(),
            capabilities: Capabilities::derive(role, false),
        }
    }

    /// Construct a client actor that has been approved to sell.
    pub fn approved_seller(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Client,
            display_name: display_name.into(),
            capabilities: Capabilities::derive(Role::Client, true),
        }
    }

    /// Whether this actor is the user identified by `id`.
    pub fn is_user(&self, id: UserId) -> bool {
        self.id == id
    }
}
