//! # lotmarket-types
//!
//! Shared types, errors, and configuration for the **LotMarket** settlement
//! engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`OfferId`], [`CollectionId`], [`TokenId`]
//! - **Asset model**: [`Asset`], [`AssetKind`]
//! - **Offer model**: [`Offer`], [`OfferState`], [`Pledge`]
//! - **Proceeds model**: [`FeeSplit`], [`RoyaltyShare`]
//! - **Events**: [`MarketEvent`]
//! - **Configuration**: [`MarketplaceConfig`]
//! - **Errors**: [`MarketError`] with `MK_ERR_` prefix codes
//! - **Collaborators**: [`AssetCustody`], [`FundsTransfer`], [`RoyaltyPolicy`], [`Transactional`]
//! - **Constants**: basis point denominators and defaults
//!
//! With the `test-helpers` feature, [`InMemoryVault`] provides an in-memory
//! implementation of every collaborator trait.

pub mod asset;
pub mod collaborator;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod offer;
pub mod split;
#[cfg(any(test, feature = "test-helpers"))]
pub mod vault;

// Re-export all primary types at crate root for ergonomic imports:
//   use lotmarket_types::{Offer, Asset, MarketError, ...};

pub use asset::*;
pub use collaborator::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use offer::*;
pub use split::*;
#[cfg(any(test, feature = "test-helpers"))]
pub use vault::*;

// Constants are accessed via `lotmarket_types::constants::FOO`
// (not re-exported to avoid name collisions).
