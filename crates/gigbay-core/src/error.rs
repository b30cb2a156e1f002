//! # Workflow Error Taxonomy
//!
//! The five error kinds every workflow operation can produce. All errors
//! are typed values built with `thiserror`; there are no silent failures
//! and no stringly-typed sentinel returns.
//!
//! ## Design
//!
//! - A denied transition always names the violated rule: current state vs
//!   required state, or actor vs required party. The boundary can surface
//!   *why* an action is unavailable, not just that it failed.
//! - `NotFound` and `Unauthorized` are distinct everywhere. A caller who
//!   may not see an entity gets `Unauthorized`, never a masking 404.

use thiserror::Error;

/// Errors produced by workflow operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// The referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind ("offer", "order", "dispute", "deliverable", "service").
        entity: &'static str,
        /// Display form of the identifier that missed.
        id: String,
    },

    /// The actor lacks the role or ownership the operation requires.
    #[error("not allowed to {action}: {rule}")]
    Unauthorized {
        /// The operation that was attempted.
        action: &'static str,
        /// The rule that was violated, in user-facing words.
        rule: String,
    },

    /// The operation is not legal from the entity's current status.
    #[error("cannot {action}: {entity} is {current}, requires {required}")]
    InvalidState {
        /// Entity kind the status belongs to.
        entity: &'static str,
        /// The operation that was attempted.
        action: &'static str,
        /// The entity's current status.
        current: String,
        /// The status(es) the operation requires.
        required: String,
    },

    /// Required input is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A uniqueness invariant would be violated, or a concurrent writer won.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl WorkflowError {
    /// Shorthand for a missing entity.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for an authorization denial.
    pub fn unauthorized(action: &'static str, rule: impl Into<String>) -> Self {
        Self::Unauthorized {
            action,
            rule: rule.into(),
        }
    }

    /// Shorthand for a state-machine rejection.
    pub fn invalid_state(
        entity: &'static str,
        action: &'static str,
        current: impl std::fmt::Display,
        required: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            entity,
            action,
            current: current.to_string(),
            required: required.into(),
        }
    }
}
