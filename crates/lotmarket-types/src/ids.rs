//! Identifiers used throughout LotMarket.
//!
//! Accounts use UUIDv7 handles. Offers use a sequential `u64` handle that is
//! assigned by the registry and never reused.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// The address of a caller, seller, bidder, or payout recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// First four bytes as hex, for compact log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0.as_bytes()[..4])
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// OfferId
// ---------------------------------------------------------------------------

/// Stable handle of an offer: its index in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OfferId(pub u64);

impl OfferId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offer:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CollectionId
// ---------------------------------------------------------------------------

/// Reference to the asset contract (collection) that issued a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CollectionId(pub String);

impl CollectionId {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// Token identifier within a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TokenId(pub u64);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_uniqueness() {
        let a = AccountId::new();
        let b = AccountId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn account_id_short_is_eight_hex_chars() {
        let a = AccountId::from_bytes([0xab; 16]);
        assert_eq!(a.short(), "abababab");
    }

    #[test]
    fn offer_id_next() {
        assert_eq!(OfferId(5).next(), OfferId(6));
    }

    #[test]
    fn display_formats() {
        assert_eq!(format!("{}", OfferId(3)), "offer:3");
        assert_eq!(format!("{}", TokenId(42)), "#42");
        assert_eq!(format!("{}", CollectionId::new("punks")), "punks");
    }

    #[test]
    fn account_id_serde() {
        let id = AccountId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
