//! # Workflow Services
//!
//! The operation layer between the HTTP surface and the engine: each
//! service loads current state from the store, consults the
//! authorization matrix, runs the pure transition, commits through the
//! version-guarded store, and returns the updated entity together with
//! the effect descriptions the boundary must dispatch.
//!
//! The order is always the same — authorize, check legality, write
//! atomically, describe effects — and nothing here ever executes an
//! effect itself: the handler hands the returned list to the
//! [`EffectDispatcher`](crate::notify::EffectDispatcher) after the
//! response is decided.
//!
//! - [`catalog::ServiceCatalog`] — service listings (post, approve, pause).
//! - [`offers::OfferManager`] — offer creation and decisions; the sole
//!   producer of orders from offers.
//! - [`orders::OrderLifecycle`] — every order transition, plus reviews.
//! - [`disputes::DisputeService`] — dispute opening, the comment thread,
//!   review, resolution, and withdrawal.

pub mod catalog;
pub mod disputes;
pub mod offers;
pub mod orders;

pub use catalog::ServiceCatalog;
pub use disputes::DisputeService;
pub use offers::OfferManager;
pub use orders::OrderLifecycle;
