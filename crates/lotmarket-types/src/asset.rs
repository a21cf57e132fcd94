//! Listed asset model.
//!
//! An offer lists either a single non-fungible item or a lot of fungible
//! units of one token id. Every settlement path matches on [`Asset`]
//! exhaustively.

use serde::{Deserialize, Serialize};

use crate::{CollectionId, TokenId};

/// The kind of asset, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    NonFungible,
    Fungible,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFungible => write!(f, "NON_FUNGIBLE"),
            Self::Fungible => write!(f, "FUNGIBLE"),
        }
    }
}

/// An asset held by the marketplace on behalf of a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    /// A unique item.
    NonFungible {
        collection: CollectionId,
        token_id: TokenId,
    },
    /// A lot of interchangeable units; `amount_remaining` shrinks on
    /// partial sales.
    Fungible {
        collection: CollectionId,
        token_id: TokenId,
        amount_remaining: u128,
    },
}

impl Asset {
    #[must_use]
    pub fn non_fungible(collection: impl Into<String>, token_id: u64) -> Self {
        Self::NonFungible {
            collection: CollectionId::new(collection),
            token_id: TokenId(token_id),
        }
    }

    #[must_use]
    pub fn fungible(collection: impl Into<String>, token_id: u64, amount: u128) -> Self {
        Self::Fungible {
            collection: CollectionId::new(collection),
            token_id: TokenId(token_id),
            amount_remaining: amount,
        }
    }

    #[must_use]
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::NonFungible { .. } => AssetKind::NonFungible,
            Self::Fungible { .. } => AssetKind::Fungible,
        }
    }

    #[must_use]
    pub fn collection(&self) -> &CollectionId {
        match self {
            Self::NonFungible { collection, .. } | Self::Fungible { collection, .. } => collection,
        }
    }

    #[must_use]
    pub fn token_id(&self) -> TokenId {
        match self {
            Self::NonFungible { token_id, .. } | Self::Fungible { token_id, .. } => *token_id,
        }
    }

    /// Number of units still for sale. A non-fungible item counts as one.
    #[must_use]
    pub fn quantity(&self) -> u128 {
        match self {
            Self::NonFungible { .. } => 1,
            Self::Fungible {
                amount_remaining, ..
            } => *amount_remaining,
        }
    }

    /// The same asset carrying `units` instead of the listed amount.
    /// Non-fungible items are returned unchanged.
    #[must_use]
    pub fn portion(&self, units: u128) -> Self {
        match self {
            Self::NonFungible { .. } => self.clone(),
            Self::Fungible {
                collection,
                token_id,
                ..
            } => Self::Fungible {
                collection: collection.clone(),
                token_id: *token_id,
                amount_remaining: units,
            },
        }
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFungible {
                collection,
                token_id,
            } => write!(f, "{collection}{token_id}"),
            Self::Fungible {
                collection,
                token_id,
                amount_remaining,
            } => write!(f, "{collection}{token_id} x{amount_remaining}"),
        }
    }
}
